//! Typed records flowing from the GitHub client into the stats layer.

use serde::Serialize;

/// Name given to a language edge that arrives without a language name.
pub const UNKNOWN_LANGUAGE: &str = "Other";

/// One repository as reported by either stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRecord {
    /// Owner-qualified name (`owner/repo`), the dedup key.
    pub name_with_owner: String,
    pub stars: u64,
    pub forks: u64,
    /// `(language, bytes)` pairs in the order the API returned them.
    pub languages: Vec<(String, u64)>,
}

impl RepositoryRecord {
    pub fn new(name_with_owner: impl Into<String>, stars: u64, forks: u64) -> Self {
        Self {
            name_with_owner: name_with_owner.into(),
            stars,
            forks,
            languages: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_language(mut self, name: impl Into<String>, size: u64) -> Self {
        self.languages.push((name.into(), size));
        self
    }
}

/// One page of a single paginated stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamPage {
    pub records: Vec<RepositoryRecord>,
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

impl StreamPage {
    /// A final page carrying `records`.
    pub fn last(records: Vec<RepositoryRecord>) -> Self {
        Self {
            records,
            has_next_page: false,
            end_cursor: None,
        }
    }

    /// A page followed by more data at `cursor`.
    pub fn more(records: Vec<RepositoryRecord>, cursor: impl Into<String>) -> Self {
        Self {
            records,
            has_next_page: true,
            end_cursor: Some(cursor.into()),
        }
    }
}

/// The result of one combined page fetch over both streams.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoPage {
    /// Repositories owned by the viewer.
    pub owned: StreamPage,
    /// Repositories the viewer contributed to.
    pub contributed: StreamPage,
}

/// A language's share of all accumulated bytes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageShare {
    pub name: String,
    pub size: u64,
    pub percentage: f64,
}

/// The terminal snapshot consumed by report rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateStats {
    pub total_contributions: u64,
    pub forks: u64,
    pub repo_count: usize,
    pub stars: u64,
    /// Descending by percentage; ties keep first-seen order.
    pub languages: Vec<LanguageShare>,
}
