//! Markdown report rendering.

use std::fs;
use std::path::{Path, PathBuf};

use ghstats::{AggregateStats, LanguageShare};

/// Icon shown for languages without an entry in [`LANGUAGE_ICONS`].
pub const FALLBACK_ICON: &str = "https://www.bonconseil.org/wp-content/uploads/2019/10/rond_gris.png";

const LANGUAGE_ICONS: &[(&str, &str)] = &[
    ("PHP", "https://pngimg.com/uploads/php/php_PNG23.png"),
    (
        "Dart",
        "https://cdn.freebiesupply.com/logos/large/2x/dart-logo-png-transparent.png",
    ),
    (
        "Kotlin",
        "https://cdn.freebiesupply.com/logos/large/2x/kotlin-1-logo-png-transparent.png",
    ),
    (
        "Shell",
        "https://tse4.mm.bing.net/th?id=OIP.nO-KdkQLpAoBAh_m_7GY8QHaId&pid=Api",
    ),
    (
        "Python",
        "https://tse2.mm.bing.net/th?id=OIP.fkvxbuKHOLhO4A_MqA9DVAHaHv&pid=Api",
    ),
    (
        "C++",
        "https://tse2.mm.bing.net/th?id=OIP.H3I3buZeC8Bkez8ADSrqMwHaHa&pid=Api",
    ),
    (
        "Css",
        "https://tse1.mm.bing.net/th?id=OIP.FCaF9-F7IFllP3x312SHEQHaHa&pid=Api",
    ),
    (
        "CMake",
        "https://tse2.mm.bing.net/th?id=OIP.SaRbjGIkNNv3lGPMq5-mJwAAAA&pid=Api",
    ),
    (
        "JavaScript",
        "https://tse4.mm.bing.net/th?id=OIP.PHBTJoshbg880IH9z_PB6QHaHa&pid=Api",
    ),
    ("Java", "https://logodix.com/logo/283001.png"),
    (
        "HTML",
        "https://www.clipartkey.com/mpngs/m/210-2104705_html-logo-png-transparent-background.png",
    ),
    (
        "Swift",
        "http://www.sic-sales.de/wp-content/uploads/2016/04/Swift_logo.svg.png",
    ),
    ("Hack", FALLBACK_ICON),
];

/// Placeholders filled with the top languages, in order.
const LANGUAGE_PLACEHOLDERS: [&str; 3] = ["<value1>", "<value2>", "<value3>"];

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to read template {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write report {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub fn language_icon(name: &str) -> &'static str {
    LANGUAGE_ICONS
        .iter()
        .find(|(language, _)| *language == name)
        .map(|(_, icon)| *icon)
        .unwrap_or(FALLBACK_ICON)
}

/// One Markdown line for a language share.
pub fn language_line(share: &LanguageShare) -> String {
    format!(
        " <code><img height=\"15\" src=\"{}\"></code>  {}: {:.0}%",
        language_icon(&share.name),
        share.name,
        share.percentage
    )
}

/// Fill the template's placeholders from `stats`.
///
/// Placeholders without a matching language are replaced by an empty string.
pub fn render_report(template: &str, stats: &AggregateStats) -> String {
    let mut rendered = template
        .replace("<commits>", &stats.total_contributions.to_string())
        .replace("<repo>", &stats.repo_count.to_string())
        .replace("<stars>", &stats.stars.to_string());

    for (i, placeholder) in LANGUAGE_PLACEHOLDERS.iter().enumerate() {
        let line = stats.languages.get(i).map(language_line).unwrap_or_default();
        rendered = rendered.replace(placeholder, &line);
    }

    rendered
}

/// Read `template`, render it and write the result to `output`.
pub fn write_report(
    template: &Path,
    output: &Path,
    stats: &AggregateStats,
) -> Result<(), ReportError> {
    let contents = fs::read_to_string(template).map_err(|source| ReportError::Read {
        path: template.to_path_buf(),
        source,
    })?;

    fs::write(output, render_report(&contents, stats)).map_err(|source| ReportError::Write {
        path: output.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn share(name: &str, percentage: f64) -> LanguageShare {
        LanguageShare {
            name: name.to_string(),
            size: 0,
            percentage,
        }
    }

    fn snapshot(languages: Vec<LanguageShare>) -> AggregateStats {
        AggregateStats {
            total_contributions: 57,
            forks: 3,
            repo_count: 6,
            stars: 42,
            languages,
        }
    }

    #[test]
    fn test_counts_replace_every_occurrence() {
        let rendered = render_report(
            "<commits> commits, <repo> repos, <stars> stars (<stars>)",
            &snapshot(Vec::new()),
        );
        assert_eq!(rendered, "57 commits, 6 repos, 42 stars (42)");
    }

    #[test]
    fn test_language_lines_fill_top_three() {
        let stats = snapshot(vec![
            share("Python", 62.4),
            share("Shell", 20.4),
            share("Rust", 10.0),
            share("C", 7.1),
        ]);

        let rendered = render_report("<value1>\n<value2>\n<value3>", &stats);
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(
            lines[0],
            " <code><img height=\"15\" src=\"https://tse2.mm.bing.net/th?id=OIP.fkvxbuKHOLhO4A_MqA9DVAHaHv&pid=Api\"></code>  Python: 62%"
        );
        assert!(lines[1].ends_with("Shell: 20%"));
        assert!(lines[2].contains(FALLBACK_ICON));
        assert!(lines[2].ends_with("Rust: 10%"));
        assert!(!rendered.contains("C:"));
    }

    #[test]
    fn test_missing_languages_leave_placeholders_empty() {
        let rendered = render_report("[<value1>][<value2>][<value3>]", &snapshot(vec![share("Go", 100.0)]));
        assert!(rendered.starts_with("[ <code>"));
        assert!(rendered.ends_with("Go: 100%][][]"));
    }

    #[test]
    fn test_unknown_language_uses_fallback_icon() {
        assert_eq!(language_icon("Zig"), FALLBACK_ICON);
        assert_eq!(language_icon("Java"), "https://logodix.com/logo/283001.png");
    }

    #[test]
    fn test_write_report_round_trip_through_files() {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join("model.md");
        let output = dir.path().join("README.md");
        fs::write(&template, "Stars: <stars>\n<value1>\n").unwrap();

        write_report(&template, &output, &snapshot(vec![share("Hack", 100.0)])).unwrap();

        let written = fs::read_to_string(&output).unwrap();
        assert!(written.starts_with("Stars: 42\n"));
        assert!(written.contains("Hack: 100%"));
    }

    #[test]
    fn test_missing_template_is_a_read_error() {
        let dir = TempDir::new().unwrap();
        let err = write_report(
            &dir.path().join("absent.md"),
            &dir.path().join("README.md"),
            &snapshot(Vec::new()),
        )
        .unwrap_err();

        assert!(matches!(err, ReportError::Read { .. }));
        assert!(!dir.path().join("README.md").exists());
    }

    #[test]
    fn test_unwritable_output_is_a_write_error() {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join("model.md");
        fs::write(&template, "<repo>").unwrap();

        let err = write_report(
            &template,
            &dir.path().join("missing-dir").join("README.md"),
            &snapshot(Vec::new()),
        )
        .unwrap_err();

        assert!(matches!(err, ReportError::Write { .. }));
    }
}
