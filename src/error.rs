use axum::{
    Json,
    extract::rejection::JsonRejection,
    response::{IntoResponse, Response},
};
use explorer_gemini::GeminiError;
use explorer_graphql::NerdGraphError;
use http::StatusCode;
use serde::Serialize;

/// Every way a proxied request can fail, and the single place those failures
/// become HTTP responses.
#[derive(thiserror::Error, Debug)]
pub enum ProxyError {
    #[error("API Key is missing in the request.")]
    MissingApiKey,

    #[error("API Key and Account ID are required.")]
    MissingAccountLookupFields,

    #[error("Log data (CSV) is missing.")]
    MissingLogData,

    #[error("{message}")]
    InvalidBody { status: StatusCode, message: String },

    #[error(
        "Gemini API key is not configured on the server. Please set the GEMINI_API_KEY environment variable to use this feature."
    )]
    GeminiKeyNotConfigured,

    #[error("A network error occurred while contacting New Relic.")]
    NerdGraph(#[source] NerdGraphError),

    #[error("An error occurred while contacting the AI service.")]
    Gemini(#[source] GeminiError),
}

/// JSON shape of every error response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ProxyError {
    pub fn invalid_body(message: impl Into<String>) -> ProxyError {
        ProxyError::InvalidBody {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            ProxyError::MissingApiKey
            | ProxyError::MissingAccountLookupFields
            | ProxyError::MissingLogData => StatusCode::BAD_REQUEST,
            ProxyError::InvalidBody { status, .. } => *status,
            ProxyError::GeminiKeyNotConfigured => StatusCode::PRECONDITION_FAILED,
            ProxyError::NerdGraph(_) | ProxyError::Gemini(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Only AI failures carry their cause back to the caller; NerdGraph causes stay in the logs.
    pub fn details(&self) -> Option<String> {
        match self {
            ProxyError::Gemini(source) => Some(source.to_string()),
            _ => None,
        }
    }
}

impl From<JsonRejection> for ProxyError {
    fn from(rejection: JsonRejection) -> Self {
        ProxyError::InvalidBody {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        match &self {
            ProxyError::NerdGraph(source) => {
                tracing::error!(error = %source, "A network error occurred: {source:?}");
            }
            ProxyError::Gemini(source) => {
                tracing::error!(error = %source, "An error occurred with the Gemini API: {source:?}");
            }
            other => tracing::debug!(status = %other.status(), "rejecting request: {other}"),
        }
        let body = ErrorBody {
            error: self.to_string(),
            details: self.details(),
        };
        (self.status(), Json(body)).into_response()
    }
}
