use bytes::Bytes;
use http::StatusCode;

/// Errors produced by an [`HttpService`](crate::HttpService)
#[derive(thiserror::Error, Debug)]
pub enum HttpServiceError {
    /// The upstream answered, but not with a 2xx status
    #[error("Bad status code: {status_code}")]
    BadStatusCode {
        /// Status the upstream answered with
        status_code: StatusCode,
        /// Body that came with it
        data: Bytes,
    },
    /// The outbound request could not be assembled
    #[error("HTTP error: {:?}", .0)]
    Http(#[from] http::Error),
    /// No response arrived before the configured timeout
    #[error("Request timed out: {:?}", .0)]
    TimedOut(Box<dyn std::error::Error + Send + Sync + 'static>),
    /// A request or response body could not be read
    #[error("Body error: {:?}", .0)]
    Body(Box<dyn std::error::Error + Send + Sync + 'static>),
    /// The connection to the upstream could not be established
    #[error("Connect error: {:?}", .0)]
    Connect(Box<dyn std::error::Error + Send + Sync + 'static>),
    /// Anything else
    #[error("Unexpected HTTP error: {:?}", .0)]
    Unexpected(Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl HttpServiceError {
    /// Whether the connection could not be established
    pub const fn is_connect(&self) -> bool {
        matches!(self, HttpServiceError::Connect(_))
    }
    /// Whether the request timed out
    pub const fn is_timeout(&self) -> bool {
        matches!(self, HttpServiceError::TimedOut(_))
    }
    /// Whether the upstream answered with a non-2xx status
    pub const fn is_status(&self) -> bool {
        matches!(self, HttpServiceError::BadStatusCode { .. })
    }
    /// The upstream status, if this error carries one
    pub const fn status_code(&self) -> Option<StatusCode> {
        match self {
            HttpServiceError::BadStatusCode { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}
