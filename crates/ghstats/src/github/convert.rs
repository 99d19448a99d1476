//! Conversion from GraphQL payloads to stats records.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::queries::year_alias;
use super::types::{
    ContributionYearsViewer, ContributionsByYearViewer, ContributionsCollection, GraphQlResponse,
    PageInfo, ReposOverviewViewer, RepositoryNode, ViewerData,
};
use crate::stats::{RepoPage, RepositoryRecord, StreamPage, UNKNOWN_LANGUAGE};

/// Decode a GraphQL envelope, returning the viewer object if present.
///
/// A body that does not match the expected shape is logged and treated as
/// empty. GraphQL `errors` are logged but do not discard `data`.
fn decode_viewer<V: DeserializeOwned>(body: &Value, query: &'static str) -> Option<V> {
    if body.as_object().is_some_and(|o| o.is_empty()) {
        return None;
    }

    let response: GraphQlResponse<ViewerData<V>> = match serde_json::from_value(body.clone()) {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(query, error = %e, "Unexpected GraphQL response shape");
            return None;
        }
    };

    for error in response.errors.iter().flatten() {
        tracing::warn!(
            query,
            message = error.message.as_deref().unwrap_or("unknown error"),
            "GraphQL error"
        );
    }

    response.data.and_then(|data| data.viewer)
}

/// Decode one item of a response, logging and skipping it on a type mismatch.
fn decode_item<T: DeserializeOwned>(value: Value, item: &'static str) -> Option<T> {
    if value.is_null() {
        return None;
    }

    match serde_json::from_value(value) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            tracing::warn!(item, error = %e, "Skipping malformed GraphQL item");
            None
        }
    }
}

fn to_record(node: RepositoryNode) -> Option<RepositoryRecord> {
    let name = node.name_with_owner?;
    let stars = node
        .stargazers
        .and_then(|s| s.total_count)
        .unwrap_or(0);

    let mut record = RepositoryRecord::new(name, stars, node.fork_count.unwrap_or(0));
    let edges = node.languages.and_then(|l| l.edges).unwrap_or_default();
    for edge in edges.into_iter().flatten() {
        let language = edge
            .node
            .and_then(|n| n.name)
            .unwrap_or_else(|| UNKNOWN_LANGUAGE.to_string());
        record.languages.push((language, edge.size.unwrap_or(0)));
    }
    Some(record)
}

fn to_stream_page(connection: Option<Value>) -> StreamPage {
    let mut connection = match connection {
        Some(Value::Object(connection)) => connection,
        None => return StreamPage::default(),
        Some(other) => {
            tracing::warn!(value = %other, "Repository connection is not an object");
            return StreamPage::default();
        }
    };

    // Page info is read apart from the nodes so a bad node cannot end pagination.
    let page_info: PageInfo = connection
        .remove("pageInfo")
        .and_then(|v| decode_item(v, "pageInfo"))
        .unwrap_or_default();

    let nodes = match connection.remove("nodes") {
        Some(Value::Array(nodes)) => nodes,
        _ => Vec::new(),
    };
    let records = nodes
        .into_iter()
        .filter_map(|node| decode_item::<RepositoryNode>(node, "repository"))
        .filter_map(to_record)
        .collect();

    StreamPage {
        records,
        has_next_page: page_info.has_next_page.unwrap_or(false),
        end_cursor: page_info.end_cursor,
    }
}

/// Decode a repositories overview response into one page per stream.
pub fn decode_repos_page(body: &Value) -> RepoPage {
    let viewer: ReposOverviewViewer = decode_viewer(body, "repos_overview").unwrap_or_default();

    RepoPage {
        owned: to_stream_page(viewer.repositories),
        contributed: to_stream_page(viewer.repositories_contributed_to),
    }
}

/// Decode the list of contribution years.
pub fn decode_contribution_years(body: &Value) -> Vec<i32> {
    decode_viewer::<ContributionYearsViewer>(body, "contribution_years")
        .and_then(|v| v.contributions_collection)
        .and_then(|c| c.contribution_years)
        .unwrap_or_default()
}

/// Decode per-year totals, in the order of `years`.
pub fn decode_contributions_by_year(body: &Value, years: &[i32]) -> Vec<Option<u64>> {
    let mut by_alias: ContributionsByYearViewer =
        decode_viewer(body, "contributions_by_year").unwrap_or_default();

    years
        .iter()
        .map(|&year| {
            by_alias
                .remove(&year_alias(year))
                .and_then(|v| decode_item::<ContributionsCollection>(v, "contributionsCollection"))
                .and_then(|c| c.contribution_calendar)
                .and_then(|c| c.total_contributions)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(name: &str, stars: u64, forks: u64, languages: Value) -> Value {
        json!({
            "nameWithOwner": name,
            "stargazers": { "totalCount": stars },
            "forkCount": forks,
            "languages": { "edges": languages },
        })
    }

    #[test]
    fn overview_decodes_both_streams() {
        let body = json!({
            "data": { "viewer": {
                "login": "octocat",
                "repositories": {
                    "pageInfo": { "hasNextPage": true, "endCursor": "abc" },
                    "nodes": [node("octocat/a", 3, 1, json!([
                        { "size": 120, "node": { "name": "Rust", "color": "#dea584" } },
                        { "size": 30, "node": { "name": "Shell" } },
                    ]))],
                },
                "repositoriesContributedTo": {
                    "pageInfo": { "hasNextPage": false, "endCursor": null },
                    "nodes": [node("org/b", 9, 2, json!([]))],
                },
            }}
        });

        let page = decode_repos_page(&body);

        assert!(page.owned.has_next_page);
        assert_eq!(page.owned.end_cursor.as_deref(), Some("abc"));
        assert_eq!(
            page.owned.records,
            vec![
                RepositoryRecord::new("octocat/a", 3, 1)
                    .with_language("Rust", 120)
                    .with_language("Shell", 30)
            ]
        );
        assert!(!page.contributed.has_next_page);
        assert_eq!(page.contributed.end_cursor, None);
        assert_eq!(page.contributed.records[0].name_with_owner, "org/b");
    }

    #[test]
    fn null_and_nameless_nodes_are_skipped() {
        let body = json!({
            "data": { "viewer": {
                "repositories": {
                    "pageInfo": { "hasNextPage": false },
                    "nodes": [null, { "forkCount": 4 }, node("me/kept", 0, 0, json!(null))],
                },
            }}
        });

        let page = decode_repos_page(&body);
        assert_eq!(page.owned.records, vec![RepositoryRecord::new("me/kept", 0, 0)]);
        assert_eq!(page.contributed, StreamPage::default());
    }

    #[test]
    fn missing_language_name_becomes_other() {
        let body = json!({
            "data": { "viewer": {
                "repositories": {
                    "nodes": [node("me/x", 0, 0, json!([
                        { "size": 7, "node": null },
                        { "node": { "name": "C" } },
                    ]))],
                },
            }}
        });

        let page = decode_repos_page(&body);
        assert_eq!(
            page.owned.records[0].languages,
            vec![(UNKNOWN_LANGUAGE.to_string(), 7), ("C".to_string(), 0)]
        );
    }

    #[test]
    fn missing_counts_default_to_zero() {
        let body = json!({
            "data": { "viewer": {
                "repositories": { "nodes": [{ "nameWithOwner": "me/bare" }] },
            }}
        });

        let record = &decode_repos_page(&body).owned.records[0];
        assert_eq!((record.stars, record.forks), (0, 0));
    }

    #[test]
    fn empty_and_malformed_bodies_decode_to_empty_pages() {
        assert_eq!(decode_repos_page(&json!({})), RepoPage::default());
        assert_eq!(decode_repos_page(&json!({ "data": null })), RepoPage::default());
        assert_eq!(decode_repos_page(&json!([1, 2, 3])), RepoPage::default());
        assert_eq!(
            decode_repos_page(&json!({ "data": { "viewer": { "repositories": "nope" } } })),
            RepoPage::default()
        );
    }

    #[test]
    fn malformed_node_is_skipped_without_ending_pagination() {
        let bad = json!({ "nameWithOwner": "me/bad", "forkCount": "n/a" });
        let body = json!({
            "data": { "viewer": {
                "repositories": {
                    "pageInfo": { "hasNextPage": true, "endCursor": "o1" },
                    "nodes": [node("me/good", 2, 1, json!([])), bad.clone()],
                },
                "repositoriesContributedTo": {
                    "pageInfo": { "hasNextPage": true, "endCursor": "c1" },
                    "nodes": [bad, node("org/good", 5, 0, json!([]))],
                },
            }}
        });

        let page = decode_repos_page(&body);

        assert_eq!(page.owned.records, vec![RepositoryRecord::new("me/good", 2, 1)]);
        assert!(page.owned.has_next_page);
        assert_eq!(page.owned.end_cursor.as_deref(), Some("o1"));
        assert_eq!(page.contributed.records, vec![RepositoryRecord::new("org/good", 5, 0)]);
        assert!(page.contributed.has_next_page);
        assert_eq!(page.contributed.end_cursor.as_deref(), Some("c1"));
    }

    #[test]
    fn malformed_page_info_keeps_nodes() {
        let body = json!({
            "data": { "viewer": {
                "repositories": {
                    "pageInfo": { "hasNextPage": "maybe" },
                    "nodes": [node("me/a", 1, 0, json!([]))],
                },
            }}
        });

        let page = decode_repos_page(&body);
        assert_eq!(page.owned.records.len(), 1);
        assert!(!page.owned.has_next_page);
    }

    #[test]
    fn graphql_errors_keep_partial_data() {
        let body = json!({
            "errors": [{ "message": "Something went wrong" }],
            "data": { "viewer": {
                "repositories": { "nodes": [node("me/partial", 1, 0, json!([]))] },
            }}
        });

        assert_eq!(decode_repos_page(&body).owned.records.len(), 1);
    }

    #[test]
    fn contribution_years_decode() {
        let body = json!({
            "data": { "viewer": { "contributionsCollection": {
                "contributionYears": [2023, 2022, 2021]
            }}}
        });
        assert_eq!(decode_contribution_years(&body), vec![2023, 2022, 2021]);
        assert!(decode_contribution_years(&json!({})).is_empty());
    }

    #[test]
    fn by_year_totals_follow_requested_order() {
        let body = json!({
            "data": { "viewer": {
                "year2021": { "contributionCalendar": { "totalContributions": 40 } },
                "year2022": null,
                "year2023": { "contributionCalendar": { "totalContributions": 17 } },
            }}
        });

        assert_eq!(
            decode_contributions_by_year(&body, &[2023, 2022, 2021, 2020]),
            vec![Some(17), None, Some(40), None]
        );
    }

    #[test]
    fn malformed_year_alias_leaves_other_years_intact() {
        let body = json!({
            "data": { "viewer": {
                "year2021": { "contributionCalendar": { "totalContributions": 40 } },
                "year2022": { "contributionCalendar": { "totalContributions": "lots" } },
                "year2023": { "contributionCalendar": { "totalContributions": 17 } },
            }}
        });

        assert_eq!(
            decode_contributions_by_year(&body, &[2023, 2022, 2021]),
            vec![Some(17), None, Some(40)]
        );
    }
}
