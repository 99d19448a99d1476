//! GraphQL documents sent by [`GitHubClient`](super::GitHubClient).

use serde_json::Value;

/// Fields requested for every repository node in both streams.
const REPOSITORY_FIELDS: &str = "\
      pageInfo {
        hasNextPage
        endCursor
      }
      nodes {
        nameWithOwner
        stargazers {
          totalCount
        }
        forkCount
        languages(first: 10, orderBy: {field: SIZE, direction: DESC}) {
          edges {
            size
            node {
              name
              color
            }
          }
        }
      }";

/// Render a cursor as a GraphQL argument: an escaped string or `null`.
fn cursor_literal(cursor: Option<&str>) -> String {
    match cursor {
        Some(c) => Value::String(c.to_string()).to_string(),
        None => "null".to_string(),
    }
}

/// One page of owned and contributed-to repositories.
pub fn repos_overview(owned_cursor: Option<&str>, contributed_cursor: Option<&str>) -> String {
    format!(
        "{{
  viewer {{
    login,
    name,
    repositories(
        first: 100,
        orderBy: {{field: UPDATED_AT, direction: DESC}},
        isFork: false,
        after: {owned}
    ) {{
{fields}
    }}
    repositoriesContributedTo(
        first: 100,
        includeUserRepositories: false,
        orderBy: {{field: UPDATED_AT, direction: DESC}},
        contributionTypes: [COMMIT, PULL_REQUEST, REPOSITORY, PULL_REQUEST_REVIEW]
        after: {contributed}
    ) {{
{fields}
    }}
  }}
}}",
        owned = cursor_literal(owned_cursor),
        contributed = cursor_literal(contributed_cursor),
        fields = REPOSITORY_FIELDS,
    )
}

/// Years in which the viewer has contributions.
pub fn contribution_years() -> String {
    "{
  viewer {
    contributionsCollection {
      contributionYears
    }
  }
}"
    .to_string()
}

/// Alias for the per-year collection of `year`.
pub fn year_alias(year: i32) -> String {
    format!("year{year}")
}

/// Contribution totals for each year, one aliased collection per year.
pub fn contributions_by_year(years: &[i32]) -> String {
    let collections: String = years
        .iter()
        .map(|&year| {
            format!(
                "    {alias}: contributionsCollection(\n        from: \"{year}-01-01T00:00:00Z\",\n        to: \"{next}-01-01T00:00:00Z\"\n    ) {{\n      contributionCalendar {{\n        totalContributions\n      }}\n    }}\n",
                alias = year_alias(year),
                next = year + 1,
            )
        })
        .collect();

    format!("{{\n  viewer {{\n{collections}  }}\n}}")
}
