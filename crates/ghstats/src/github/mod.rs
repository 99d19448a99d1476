//! GitHub API client feeding the stats engine.
//!
//! # Module Structure
//!
//! - [`queries`] - GraphQL documents
//! - [`types`] - Response payloads
//! - `convert` - Payload conversion to stats records
//! - `client` - [`GitHubClient`], the [`StatsSource`](crate::stats::StatsSource) implementation

mod client;
mod convert;
pub mod queries;
pub mod types;

pub use client::GitHubClient;
pub use convert::{decode_contribution_years, decode_contributions_by_year, decode_repos_page};
