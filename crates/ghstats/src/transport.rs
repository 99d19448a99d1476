//! Request execution with channel fallback and 202 retries.
//!
//! [`Transport::execute`] never fails. Every outcome that is not a usable
//! JSON body degrades to an empty JSON object after being logged, so callers
//! fold whatever data did arrive.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use ghstats::http::{BlockingTransport, ReqwestTransport};
//! use ghstats::transport::{QueryRequest, Transport};
//!
//! let transport = Transport::new(
//!     token,
//!     Arc::new(ReqwestTransport::new(reqwest::Client::new())),
//!     Arc::new(BlockingTransport::new()),
//! );
//! let viewer = transport
//!     .execute(&QueryRequest::graphql("{ viewer { login } }"))
//!     .await;
//! ```

mod error;
mod request;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use backon::Retryable;
use serde_json::{Map, Value};
use url::Url;

use crate::gate::ConcurrencyGate;
use crate::http::{HttpMethod, HttpRequest, HttpTransport};
use crate::retry::RetryConfig;

pub use error::{TransportError, short_error_message};
pub use request::QueryRequest;

/// Root of the public GitHub API.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const USER_AGENT: &str = concat!("ghstats/", env!("CARGO_PKG_VERSION"));
const ACCEPT: &str = "application/vnd.github+json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Channel {
    Primary,
    Fallback,
}

impl Channel {
    fn as_str(self) -> &'static str {
        match self {
            Channel::Primary => "primary",
            Channel::Fallback => "fallback",
        }
    }
}

/// The request layer used by the GitHub client.
///
/// Cloning is cheap and shares both channels and the concurrency gate.
#[derive(Clone)]
pub struct Transport {
    primary: Arc<dyn HttpTransport>,
    fallback: Arc<dyn HttpTransport>,
    gate: ConcurrencyGate,
    token: Arc<String>,
    api_url: String,
    retry: RetryConfig,
}

impl Transport {
    /// Create a transport with the default gate, retry schedule and API root.
    pub fn new(
        token: impl Into<String>,
        primary: Arc<dyn HttpTransport>,
        fallback: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            primary,
            fallback,
            gate: ConcurrencyGate::default(),
            token: Arc::new(token.into()),
            api_url: DEFAULT_API_URL.to_string(),
            retry: RetryConfig::default(),
        }
    }

    /// Share an existing concurrency gate.
    #[must_use]
    pub fn with_gate(mut self, gate: ConcurrencyGate) -> Self {
        self.gate = gate;
        self
    }

    /// Override the 202 retry schedule.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Point the transport at another API root (GitHub Enterprise, tests).
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn gate(&self) -> &ConcurrencyGate {
        &self.gate
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Run a GraphQL document.
    pub async fn query(&self, query: &str) -> Value {
        self.execute(&QueryRequest::graphql(query)).await
    }

    /// Run a REST `GET` against `path` with ordered query parameters.
    pub async fn query_rest(&self, path: &str, params: &[(String, String)]) -> Value {
        self.execute(&QueryRequest::Rest {
            path: path.to_string(),
            params: params.to_vec(),
        })
        .await
    }

    /// Execute one logical request.
    ///
    /// GraphQL requests get at most one fallback attempt. REST requests are
    /// additionally retried while the API answers `202 Accepted`.
    pub async fn execute(&self, request: &QueryRequest) -> Value {
        let label = request.label();

        let http_request = match self.build_http_request(request) {
            Ok(http_request) => http_request,
            Err(e) => {
                tracing::warn!(request = label, error = %e, "Could not build request");
                return empty_result();
            }
        };

        let result = match request {
            QueryRequest::GraphQl { .. } => {
                self.attempt_with_fallback(&http_request, label, false)
                    .await
            }
            QueryRequest::Rest { .. } => self.execute_with_retry(&http_request, label).await,
        };

        match result {
            Ok(value) => value,
            Err(e) if e.is_pending() => {
                tracing::warn!(
                    request = label,
                    attempts = self.retry.max_attempts,
                    "Too many 202 responses; data for this resource will be incomplete"
                );
                empty_result()
            }
            Err(e) => {
                tracing::warn!(
                    request = label,
                    error = %short_error_message(&e),
                    "Request failed; continuing with an empty result"
                );
                empty_result()
            }
        }
    }

    async fn execute_with_retry(
        &self,
        request: &HttpRequest,
        label: &str,
    ) -> Result<Value, TransportError> {
        let attempt = AtomicUsize::new(0);

        let operation = || {
            attempt.fetch_add(1, Ordering::SeqCst);
            self.attempt_with_fallback(request, label, true)
        };

        operation
            .retry(self.retry.into_backoff())
            .when(TransportError::is_pending)
            .notify(|err, dur| {
                tracing::debug!(
                    request = label,
                    attempt = attempt.load(Ordering::SeqCst),
                    "{}, retrying in {:?}",
                    short_error_message(err),
                    dur
                );
            })
            .await
    }

    async fn attempt_with_fallback(
        &self,
        request: &HttpRequest,
        label: &str,
        retry_pending: bool,
    ) -> Result<Value, TransportError> {
        match self.attempt(Channel::Primary, request, retry_pending).await {
            Err(e) if e.is_fallback_eligible() => {
                tracing::warn!(
                    request = label,
                    error = %short_error_message(&e),
                    "Primary channel failed, retrying on fallback channel"
                );
                self.attempt(Channel::Fallback, request, retry_pending)
                    .await
            }
            other => other,
        }
    }

    async fn attempt(
        &self,
        channel: Channel,
        request: &HttpRequest,
        retry_pending: bool,
    ) -> Result<Value, TransportError> {
        let response = {
            let _permit = self
                .gate
                .acquire()
                .await
                .map_err(|_| TransportError::GateClosed)?;

            let transport = match channel {
                Channel::Primary => &self.primary,
                Channel::Fallback => &self.fallback,
            };
            transport.send(request.clone()).await?
        };

        tracing::trace!(
            channel = channel.as_str(),
            status = response.status,
            "Received response"
        );

        if retry_pending && response.status == 202 {
            return Err(TransportError::Pending {
                status: response.status,
            });
        }

        decode_body(&response.body)
    }

    fn build_http_request(&self, request: &QueryRequest) -> Result<HttpRequest, TransportError> {
        match request {
            QueryRequest::GraphQl { query } => Ok(HttpRequest {
                method: HttpMethod::Post,
                url: format!("{}/graphql", self.api_url),
                headers: vec![
                    (
                        "Authorization".to_string(),
                        format!("Bearer {}", self.token.as_str()),
                    ),
                    ("User-Agent".to_string(), USER_AGENT.to_string()),
                    ("Accept".to_string(), ACCEPT.to_string()),
                    ("Content-Type".to_string(), "application/json".to_string()),
                ],
                body: serde_json::json!({ "query": query }).to_string().into_bytes(),
            }),
            QueryRequest::Rest { path, params } => {
                let raw = format!("{}/{}", self.api_url, path.trim_start_matches('/'));
                let mut url = Url::parse(&raw)
                    .map_err(|e| TransportError::invalid_request(format!("{raw}: {e}")))?;
                if !params.is_empty() {
                    url.query_pairs_mut()
                        .extend_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
                }

                Ok(HttpRequest {
                    method: HttpMethod::Get,
                    url: url.to_string(),
                    headers: vec![
                        (
                            "Authorization".to_string(),
                            format!("token {}", self.token.as_str()),
                        ),
                        ("User-Agent".to_string(), USER_AGENT.to_string()),
                        ("Accept".to_string(), ACCEPT.to_string()),
                    ],
                    body: Vec::new(),
                })
            }
        }
    }
}

/// The value returned when a request yields nothing usable.
#[must_use]
pub fn empty_result() -> Value {
    Value::Object(Map::new())
}

fn decode_body(body: &[u8]) -> Result<Value, TransportError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Null) => Err(TransportError::decode("response body was null")),
        Ok(value) => Ok(value),
        Err(e) => Err(TransportError::decode(e.to_string())),
    }
}
