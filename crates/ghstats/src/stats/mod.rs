//! Aggregation engine: pagination, dedup fold and memoized accessors.
//!
//! [`Stats`] computes each aggregate at most once. The repository fold
//! (stars, forks, repos, languages) shares one computation; contributions are
//! computed independently. Concurrent first access waits on the computation
//! already in flight instead of starting another.

mod accumulator;
mod contributions;
mod pagination;
mod types;

use async_trait::async_trait;
use tokio::sync::OnceCell;

pub use accumulator::{LanguageTotals, RepoAccumulator, RepoStats};
pub use contributions::total_contributions;
pub use pagination::{PaginationSummary, StreamCursor, paginate};
pub use types::{
    AggregateStats, LanguageShare, RepoPage, RepositoryRecord, StreamPage, UNKNOWN_LANGUAGE,
};

/// Where the engine pulls data from.
///
/// Implementations never fail: a request that produced nothing usable
/// returns an empty page or an empty list.
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Fetch one page of both repository streams.
    async fn fetch_repos_page(
        &self,
        owned_cursor: Option<&str>,
        contributed_cursor: Option<&str>,
    ) -> RepoPage;

    /// Years in which the account has contributions.
    async fn fetch_contribution_years(&self) -> Vec<i32>;

    /// Per-year contribution totals, `None` where the API gave none.
    async fn fetch_contributions_by_year(&self, years: &[i32]) -> Vec<Option<u64>>;
}

/// Memoized statistics over a [`StatsSource`].
pub struct Stats<S> {
    source: S,
    repo_stats: OnceCell<RepoStats>,
    contributions: OnceCell<u64>,
}

impl<S: StatsSource> Stats<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            repo_stats: OnceCell::new(),
            contributions: OnceCell::new(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn stargazers(&self) -> u64 {
        self.repo_stats().await.stars
    }

    pub async fn forks(&self) -> u64 {
        self.repo_stats().await.forks
    }

    /// Deduplicated repository names in first-seen order.
    pub async fn repos(&self) -> &[String] {
        &self.repo_stats().await.repos
    }

    pub async fn languages(&self) -> &LanguageTotals {
        &self.repo_stats().await.languages
    }

    /// Language shares, descending by percentage.
    pub async fn languages_proportional(&self) -> &[LanguageShare] {
        &self.repo_stats().await.proportions
    }

    pub async fn total_contributions(&self) -> u64 {
        *self
            .contributions
            .get_or_init(|| async {
                let total = total_contributions(&self.source).await;
                tracing::info!(total, "Counted contributions");
                total
            })
            .await
    }

    /// Snapshot of every aggregate. Both computations run concurrently.
    pub async fn aggregate(&self) -> AggregateStats {
        let (repo_stats, total_contributions) =
            tokio::join!(self.repo_stats(), self.total_contributions());

        AggregateStats {
            total_contributions,
            forks: repo_stats.forks,
            repo_count: repo_stats.repos.len(),
            stars: repo_stats.stars,
            languages: repo_stats.proportions.clone(),
        }
    }

    async fn repo_stats(&self) -> &RepoStats {
        self.repo_stats
            .get_or_init(|| self.compute_repo_stats())
            .await
    }

    async fn compute_repo_stats(&self) -> RepoStats {
        let mut acc = RepoAccumulator::new();
        let mut duplicates = 0usize;

        let summary = paginate(&self.source, |record| {
            if !acc.fold(record) {
                duplicates += 1;
            }
        })
        .await;

        let stats = acc.finish();
        tracing::info!(
            rounds = summary.rounds,
            repos = stats.repos.len(),
            duplicates,
            stars = stats.stars,
            forks = stats.forks,
            languages = stats.languages.len(),
            "Collected repository statistics"
        );
        stats
    }
}
