//! GraphQL response payloads.
//!
//! Every field is optional so a partial response still decodes; absent values
//! become zero or empty during conversion. Repository connections and
//! per-year aliases are held as raw JSON and decoded item by item, so one
//! malformed node is skipped without losing its neighbours.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

/// The GraphQL response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlError {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewerData<V> {
    pub viewer: Option<V>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReposOverviewViewer {
    pub login: Option<String>,
    /// `{ pageInfo, nodes }` connection, decoded by `convert`.
    pub repositories: Option<Value>,
    pub repositories_contributed_to: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: Option<bool>,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryNode {
    pub name_with_owner: Option<String>,
    pub stargazers: Option<CountConnection>,
    pub fork_count: Option<u64>,
    pub languages: Option<LanguageConnection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountConnection {
    pub total_count: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LanguageConnection {
    pub edges: Option<Vec<Option<LanguageEdge>>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LanguageEdge {
    pub size: Option<u64>,
    pub node: Option<LanguageNode>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LanguageNode {
    pub name: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionYearsViewer {
    pub contributions_collection: Option<ContributionYears>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionYears {
    pub contribution_years: Option<Vec<i32>>,
}

/// Aliased `year{Y}` collections keyed by alias, each decoded on its own.
pub type ContributionsByYearViewer = HashMap<String, Value>;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionsCollection {
    pub contribution_calendar: Option<ContributionCalendar>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionCalendar {
    pub total_contributions: Option<u64>,
}
