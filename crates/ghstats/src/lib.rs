//! ghstats - GitHub account statistics.
//!
//! This library collects repository, star, fork, contribution and language
//! totals for the authenticated GitHub viewer. Requests go through a
//! concurrency-bounded [`Transport`] with a blocking fallback channel and
//! retries for REST resources GitHub is still computing.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use ghstats::http::{BlockingTransport, ReqwestTransport};
//! use ghstats::{GitHubClient, Stats, Transport};
//!
//! let transport = Transport::new(
//!     token,
//!     Arc::new(ReqwestTransport::new(reqwest::Client::new())),
//!     Arc::new(BlockingTransport::new()),
//! );
//! let stats = Stats::new(GitHubClient::new(transport, "octocat"));
//!
//! let snapshot = stats.aggregate().await;
//! println!("{} stars across {} repositories", snapshot.stars, snapshot.repo_count);
//! ```

pub mod gate;
pub mod github;
pub mod http;
pub mod retry;
pub mod stats;
pub mod transport;

pub use gate::{ConcurrencyGate, DEFAULT_MAX_CONNECTIONS};
pub use github::GitHubClient;
pub use retry::RetryConfig;
pub use stats::{AggregateStats, LanguageShare, Stats, StatsSource};
pub use transport::{DEFAULT_API_URL, QueryRequest, Transport, TransportError};
