use thiserror::Error;

use crate::http::HttpError;

/// Errors from a single attempt to run a request on one channel.
///
/// These never escape [`Transport::execute`](super::Transport::execute);
/// they decide whether an attempt falls back, retries or gives up.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request timed out.
    #[error("request timed out: {message}")]
    Timeout { message: String },

    /// The connection could not be established or was lost.
    #[error("connection error: {message}")]
    Connection { message: String },

    /// The response body was not usable JSON.
    #[error("decode error: {message}")]
    Decode { message: String },

    /// The server accepted the request but the resource is not ready yet.
    #[error("resource still processing (HTTP {status})")]
    Pending { status: u16 },

    /// The request could not be built (bad URL or path).
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    /// The concurrency gate was closed.
    #[error("concurrency gate closed")]
    GateClosed,
}

impl TransportError {
    /// Create a decode error.
    #[inline]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create an invalid-request error.
    #[inline]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Whether the same request should be retried once on the fallback channel.
    #[inline]
    pub fn is_fallback_eligible(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::Connection { .. } | Self::Decode { .. }
        )
    }

    /// Whether the request should be retried after the fixed delay.
    #[inline]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }
}

impl From<HttpError> for TransportError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Timeout(message) => Self::Timeout { message },
            HttpError::Connect(message) => Self::Connection { message },
            HttpError::Transport(message) => Self::Connection { message },
            other @ HttpError::NoMockResponse { .. } => Self::Connection {
                message: other.to_string(),
            },
        }
    }
}

/// Extract a short error message suitable for display.
///
/// Takes the first line of an error message, which keeps log lines for
/// errors with multi-line sources readable.
#[inline]
pub fn short_error_message(e: &impl std::error::Error) -> String {
    let full = e.to_string();
    full.lines().next().unwrap_or(&full).to_string()
}
