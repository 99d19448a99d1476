use async_trait::async_trait;
use serde_json::Value;

use super::convert::{decode_contribution_years, decode_contributions_by_year, decode_repos_page};
use super::queries;
use crate::stats::{RepoPage, StatsSource};
use crate::transport::Transport;

/// GitHub API client for a single viewer.
///
/// GraphQL queries run as the authenticated viewer. The login is used for
/// REST paths and log context only.
#[derive(Clone)]
pub struct GitHubClient {
    transport: Transport,
    viewer: String,
}

impl GitHubClient {
    pub fn new(transport: Transport, viewer: impl Into<String>) -> Self {
        Self {
            transport,
            viewer: viewer.into(),
        }
    }

    pub fn viewer(&self) -> &str {
        &self.viewer
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// `GET` a REST path, retrying while GitHub is still computing it.
    pub async fn query_rest(&self, path: &str, params: &[(String, String)]) -> Value {
        self.transport.query_rest(path, params).await
    }
}

#[async_trait]
impl StatsSource for GitHubClient {
    async fn fetch_repos_page(
        &self,
        owned_cursor: Option<&str>,
        contributed_cursor: Option<&str>,
    ) -> RepoPage {
        let body = self
            .transport
            .query(&queries::repos_overview(owned_cursor, contributed_cursor))
            .await;
        decode_repos_page(&body)
    }

    async fn fetch_contribution_years(&self) -> Vec<i32> {
        let body = self.transport.query(&queries::contribution_years()).await;
        let years = decode_contribution_years(&body);
        tracing::debug!(viewer = %self.viewer, years = years.len(), "Fetched contribution years");
        years
    }

    async fn fetch_contributions_by_year(&self, years: &[i32]) -> Vec<Option<u64>> {
        let body = self
            .transport
            .query(&queries::contributions_by_year(years))
            .await;
        decode_contributions_by_year(&body, years)
    }
}
