//! Cursor-driven pagination over the owned and contributed-to streams.

use super::StatsSource;
use super::types::{RepositoryRecord, StreamPage};

/// Position within one stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamCursor {
    /// `None` means start of stream.
    pub cursor: Option<String>,
    /// Set the first time the stream reports no further pages. Never reset.
    pub exhausted: bool,
}

impl StreamCursor {
    /// Advance using the page just received.
    ///
    /// The cursor keeps its previous value when the page carries no end
    /// cursor.
    pub fn advance(&mut self, page: &StreamPage) {
        if let Some(end) = &page.end_cursor {
            self.cursor = Some(end.clone());
        }
        if !page.has_next_page {
            self.exhausted = true;
        }
    }
}

/// Outcome of a full pagination run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationSummary {
    /// Page fetches issued.
    pub rounds: usize,
    /// Records handed to the fold, duplicates included.
    pub records: usize,
}

/// Fetch pages until both streams are exhausted, feeding every record to
/// `on_record` (owned stream first, then contributed).
///
/// An exhausted stream keeps being sent its last cursor while the other
/// stream still has pages; the fold's dedup makes the repeat harmless.
pub async fn paginate<S, F>(source: &S, mut on_record: F) -> PaginationSummary
where
    S: StatsSource + ?Sized,
    F: FnMut(RepositoryRecord),
{
    let mut owned = StreamCursor::default();
    let mut contributed = StreamCursor::default();
    let mut summary = PaginationSummary::default();

    loop {
        let page = source
            .fetch_repos_page(owned.cursor.as_deref(), contributed.cursor.as_deref())
            .await;
        summary.rounds += 1;

        owned.advance(&page.owned);
        contributed.advance(&page.contributed);

        tracing::debug!(
            round = summary.rounds,
            owned = page.owned.records.len(),
            contributed = page.contributed.records.len(),
            owned_exhausted = owned.exhausted,
            contributed_exhausted = contributed.exhausted,
            "Fetched repository page"
        );

        for record in page.owned.records.into_iter().chain(page.contributed.records) {
            summary.records += 1;
            on_record(record);
        }

        if owned.exhausted && contributed.exhausted {
            break;
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::test_support::{ScriptedSource, repo};
    use crate::stats::types::RepoPage;

    #[test]
    fn cursor_keeps_previous_value_when_end_cursor_missing() {
        let mut cursor = StreamCursor::default();
        cursor.advance(&StreamPage::more(Vec::new(), "c1"));
        assert_eq!(cursor.cursor.as_deref(), Some("c1"));

        cursor.advance(&StreamPage {
            records: Vec::new(),
            has_next_page: true,
            end_cursor: None,
        });
        assert_eq!(cursor.cursor.as_deref(), Some("c1"));
        assert!(!cursor.exhausted);
    }

    #[test]
    fn exhaustion_is_permanent() {
        let mut cursor = StreamCursor::default();
        cursor.advance(&StreamPage::last(Vec::new()));
        assert!(cursor.exhausted);

        cursor.advance(&StreamPage::more(Vec::new(), "late"));
        assert!(cursor.exhausted);
    }

    #[tokio::test]
    async fn rounds_equal_longest_stream() {
        let source = ScriptedSource::new()
            .owned_pages(vec![
                vec![repo("me/1", 0, 0)],
                vec![repo("me/2", 0, 0)],
                vec![repo("me/3", 0, 0)],
                vec![repo("me/4", 0, 0)],
            ])
            .contributed_pages(vec![vec![repo("org/1", 0, 0)], vec![repo("org/2", 0, 0)]]);

        let summary = paginate(&source, |_| {}).await;

        assert_eq!(summary.rounds, 4);
        assert_eq!(source.page_calls(), 4);
    }

    #[tokio::test]
    async fn single_empty_round_terminates() {
        let source = ScriptedSource::new();
        let summary = paginate(&source, |_| {}).await;
        assert_eq!(summary, PaginationSummary { rounds: 1, records: 0 });
    }

    #[tokio::test]
    async fn records_arrive_owned_first_then_contributed() {
        let source = ScriptedSource::new()
            .owned_pages(vec![vec![repo("me/a", 0, 0), repo("me/b", 0, 0)]])
            .contributed_pages(vec![vec![repo("org/c", 0, 0)]]);

        let mut names = Vec::new();
        paginate(&source, |r| names.push(r.name_with_owner)).await;

        assert_eq!(names, vec!["me/a", "me/b", "org/c"]);
    }

    #[tokio::test]
    async fn cursors_advance_per_stream() {
        let source = ScriptedSource::new()
            .owned_pages(vec![vec![], vec![], vec![]])
            .contributed_pages(vec![vec![]]);

        paginate(&source, |_| {}).await;

        assert_eq!(
            source.cursors_seen(),
            vec![
                (None, None),
                (Some("owned-1".to_string()), Some("contributed-1".to_string())),
                (Some("owned-2".to_string()), Some("contributed-1".to_string())),
            ]
        );
    }

    #[tokio::test]
    async fn failed_fetch_ends_pagination() {
        struct Broken;

        #[async_trait::async_trait]
        impl StatsSource for Broken {
            async fn fetch_repos_page(&self, _: Option<&str>, _: Option<&str>) -> RepoPage {
                RepoPage::default()
            }
            async fn fetch_contribution_years(&self) -> Vec<i32> {
                Vec::new()
            }
            async fn fetch_contributions_by_year(&self, _: &[i32]) -> Vec<Option<u64>> {
                Vec::new()
            }
        }

        let summary = paginate(&Broken, |_| {}).await;
        assert_eq!(summary.rounds, 1);
    }
}
