//! HTTP channel seam.
//!
//! Every network call in the crate goes through [`HttpTransport`]. Two real
//! channels are provided: [`ReqwestTransport`] (async, the primary channel)
//! and [`BlockingTransport`] (a blocking client driven on the tokio blocking
//! pool, used as the fallback channel).

use std::sync::{Arc, OnceLock};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use thiserror::Error;

/// Minimal HTTP method enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// HTTP headers represented as key/value pairs.
///
/// Header names are treated case-insensitively by helper functions.
pub type HttpHeaders = Vec<(String, String)>;

/// A minimal HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HttpHeaders,
    pub body: Vec<u8>,
}

impl HttpRequest {
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        header_get(&self.headers, name)
    }
}

/// A minimal HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HttpHeaders,
    pub body: Vec<u8>,
}

impl HttpResponse {
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        header_get(&self.headers, name)
    }
}

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("http transport error: {0}")]
    Transport(String),

    #[error("no mock response registered for {method} {url}")]
    NoMockResponse { method: String, url: String },
}

impl From<reqwest::Error> for HttpError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            HttpError::Timeout(e.to_string())
        } else if e.is_connect() {
            HttpError::Connect(e.to_string())
        } else {
            HttpError::Transport(e.to_string())
        }
    }
}

/// Transport boundary for all HTTP I/O.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}

/// Get the first header value matching `name` (case-insensitive).
#[must_use]
pub fn header_get<'a>(headers: &'a HttpHeaders, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

fn collect_headers(map: &reqwest::header::HeaderMap) -> HttpHeaders {
    map.iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                value.to_str().unwrap_or_default().to_string(),
            )
        })
        .collect()
}

/// The async HTTP channel, backed by `reqwest::Client`.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn with_timeout(timeout: StdDuration) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        };

        let mut builder = self.client.request(method, &request.url);
        for (k, v) in request.headers {
            builder = builder.header(&k, &v);
        }

        if !request.body.is_empty() {
            builder = builder.body(request.body);
        }

        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let headers = collect_headers(resp.headers());
        let body = resp.bytes().await?.to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// The fallback HTTP channel, backed by `reqwest::blocking::Client`.
///
/// Requests run on the tokio blocking pool. The client is built lazily on
/// the first request, inside that pool, since the blocking client must not
/// be constructed on an async worker thread.
#[derive(Clone, Default)]
pub struct BlockingTransport {
    client: Arc<OnceLock<reqwest::blocking::Client>>,
    timeout: Option<StdDuration>,
}

impl BlockingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: StdDuration) -> Self {
        Self {
            client: Arc::default(),
            timeout: Some(timeout),
        }
    }

    fn client(&self) -> Result<&reqwest::blocking::Client, HttpError> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }

        let mut builder = reqwest::blocking::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(self.client.get_or_init(|| client))
    }

    fn send_blocking(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        };

        let mut builder = self.client()?.request(method, &request.url);
        for (k, v) in request.headers {
            builder = builder.header(&k, &v);
        }

        if !request.body.is_empty() {
            builder = builder.body(request.body);
        }

        let resp = builder.send()?;
        let status = resp.status().as_u16();
        let headers = collect_headers(resp.headers());
        let body = resp.bytes()?.to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[async_trait]
impl HttpTransport for BlockingTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let channel = self.clone();
        tokio::task::spawn_blocking(move || channel.send_blocking(request))
            .await
            .map_err(|e| HttpError::Transport(format!("blocking request task failed: {e}")))?
    }
}

// ---------- Test-only mock transport ----------

#[cfg(test)]
use std::collections::{HashMap, VecDeque};
#[cfg(test)]
use std::sync::Mutex;

/// In-memory channel for unit tests.
///
/// Replays queued results per method and URL and records every request.
#[cfg(test)]
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

#[cfg(test)]
#[derive(Default)]
struct MockTransportInner {
    routes: HashMap<(HttpMethod, String), VecDeque<Result<HttpResponse, HttpError>>>,
    requests: Vec<HttpRequest>,
}

#[cfg(test)]
impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for `method` and `url`. Queued results replay in order.
    pub fn push_response(
        &self,
        method: HttpMethod,
        url: impl Into<String>,
        response: HttpResponse,
    ) {
        self.push_result(method, url, Ok(response));
    }

    /// Register an error for a method + URL.
    pub fn push_error(&self, method: HttpMethod, url: impl Into<String>, error: HttpError) {
        self.push_result(method, url, Err(error));
    }

    /// Register a `200 OK` response carrying `body` as JSON.
    pub fn push_json(&self, method: HttpMethod, url: impl Into<String>, body: serde_json::Value) {
        self.push_response(method, url, json_response(200, &body));
    }

    fn push_result(
        &self,
        method: HttpMethod,
        url: impl Into<String>,
        result: Result<HttpResponse, HttpError>,
    ) {
        let mut inner = self
            .inner
            .lock()
            .expect("mock transport lock poisoned");
        inner
            .routes
            .entry((method, url.into()))
            .or_default()
            .push_back(result);
    }

    #[must_use]
    pub fn requests(&self) -> Vec<HttpRequest> {
        let inner = self
            .inner
            .lock()
            .expect("mock transport lock poisoned");
        inner.requests.clone()
    }
}

#[cfg(test)]
pub fn json_response(status: u16, body: &serde_json::Value) -> HttpResponse {
    HttpResponse {
        status,
        headers: vec![("Content-Type".to_string(), "application/json".to_string())],
        body: body.to_string().into_bytes(),
    }
}

#[cfg(test)]
#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let mut inner = self
            .inner
            .lock()
            .expect("mock transport lock poisoned");

        let key = (request.method, request.url.clone());
        inner.requests.push(request);

        match inner.routes.get_mut(&key).and_then(|q| q.pop_front()) {
            Some(result) => result,
            None => Err(HttpError::NoMockResponse {
                method: key.0.as_str().to_string(),
                url: key.1,
            }),
        }
    }
}
