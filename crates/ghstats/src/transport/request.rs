/// A single logical request against the GitHub API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryRequest {
    /// A GraphQL document, sent as `{"query": ...}`.
    GraphQl { query: String },
    /// A REST path (relative to the API root) with ordered query parameters.
    Rest {
        path: String,
        params: Vec<(String, String)>,
    },
}

impl QueryRequest {
    pub fn graphql(query: impl Into<String>) -> Self {
        Self::GraphQl {
            query: query.into(),
        }
    }

    pub fn rest(path: impl Into<String>) -> Self {
        Self::Rest {
            path: path.into(),
            params: Vec::new(),
        }
    }

    /// Append a query parameter. Has no effect on GraphQL requests.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let Self::Rest { params, .. } = &mut self {
            params.push((key.into(), value.into()));
        }
        self
    }

    /// Short label for log lines. Never includes the GraphQL document.
    pub fn label(&self) -> &str {
        match self {
            Self::GraphQl { .. } => "graphql",
            Self::Rest { path, .. } => path.trim_start_matches('/'),
        }
    }
}
