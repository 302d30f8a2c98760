#![warn(missing_docs)]

//! Sends a single text prompt to Gemini's `generateContent` endpoint over an HTTP [`Service`]

use std::{fmt, str::FromStr};

use bytes::Bytes;
use explorer_http::{HttpRequest, HttpResponse};
use explorer_tower::ResponseFuture;
use http::{
    HeaderValue, Method, StatusCode, Uri,
    header::{InvalidHeaderValue, CONTENT_TYPE},
    uri::InvalidUri,
};
use http_body_util::Full;
use tower::{Layer, Service};
use url::Url;

mod types;

use types::{GenerateContentRequest, GenerateContentResponse};

/// Public Gemini API root
pub const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used when none is configured
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";

/// Header Gemini reads the API key from
pub const API_KEY_HEADER: &str = "x-goog-api-key";

const JSON_CONTENT_TYPE: &str = "application/json";

/// A prompt and the key to send it with
#[derive(Clone, PartialEq)]
pub struct GeminiRequest {
    prompt: String,
    api_key: String,
}

impl fmt::Debug for GeminiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiRequest")
            .field("prompt_len", &self.prompt.len())
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl GeminiRequest {
    /// Constructs a new [`GeminiRequest`]
    pub fn new(prompt: impl Into<String>, api_key: impl Into<String>) -> GeminiRequest {
        GeminiRequest {
            prompt: prompt.into(),
            api_key: api_key.into(),
        }
    }
}

/// Errors that may occur from using a [`GeminiService`]
#[derive(thiserror::Error, Debug)]
pub enum GeminiError {
    /// The request body could not be serialized
    #[error("Serialization error: {}", .0)]
    Serialization(serde_json::Error),
    /// The API key contains characters that cannot go in a header
    #[error("The Gemini API key is not a valid header value")]
    InvalidApiKey(#[from] InvalidHeaderValue),
    /// The response was not the JSON we expected
    #[error("Could not decode the {status_code} response: {error}")]
    Deserialization {
        /// The source error
        error: serde_json::Error,
        /// The data that was attempted to be deserialized
        data: Bytes,
        /// The [`StatusCode`] of the response
        status_code: StatusCode,
    },
    /// Gemini answered, but without any text
    #[error("The model returned no text (reason: {})", .reason.as_deref().unwrap_or("unknown"))]
    NoText {
        /// Finish or block reason reported by Gemini
        reason: Option<String>,
    },
    /// [`http`]-related error, probably from building the request
    #[error("HTTP error: {:?}", .0)]
    Http(#[from] http::Error),
    /// The configured base URL and model do not make a valid URI
    #[error("Unable to build the generateContent URI.")]
    InvalidUri(#[from] InvalidUri),
    /// Errors that occur as a result of the underlying HTTP service failing
    #[error("Upstream service error: {}", .0)]
    UpstreamService(Box<dyn std::error::Error + Send + Sync>),
}

/// [`Layer`] that wraps an HTTP service with Gemini text generation
#[derive(Clone, Debug)]
pub struct GeminiLayer {
    base_url: Url,
    model: String,
}

impl GeminiLayer {
    /// Constructs a new [`GeminiLayer`] for `model` under `base_url`
    pub fn new(base_url: Url, model: impl Into<String>) -> GeminiLayer {
        GeminiLayer {
            base_url,
            model: model.into(),
        }
    }
}

impl<S> Layer<S> for GeminiLayer {
    type Service = GeminiService<S>;
    fn layer(&self, inner: S) -> Self::Service {
        GeminiService {
            inner,
            base_url: self.base_url.clone(),
            model: self.model.clone(),
        }
    }
}

/// Middleware that turns a [`GeminiRequest`] into generated text
#[derive(Clone, Debug)]
pub struct GeminiService<S> {
    inner: S,
    base_url: Url,
    model: String,
}

impl<S> GeminiService<S> {
    /// The `generateContent` URI for the configured model
    pub fn generate_content_uri(&self) -> Result<Uri, InvalidUri> {
        generate_content_uri(&self.base_url, &self.model)
    }
}

fn generate_content_uri(base_url: &Url, model: &str) -> Result<Uri, InvalidUri> {
    Uri::from_str(&format!(
        "{}/models/{}:generateContent",
        base_url.as_str().trim_end_matches('/'),
        model
    ))
}

fn build_request(uri: Uri, req: GeminiRequest) -> Result<HttpRequest, GeminiError> {
    let mut api_key = HeaderValue::from_str(&req.api_key)?;
    api_key.set_sensitive(true);
    let body = serde_json::to_vec(&GenerateContentRequest::from_prompt(req.prompt))
        .map_err(GeminiError::Serialization)?;
    let req = http::Request::builder()
        .uri(uri)
        .method(Method::POST)
        .header(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))
        .header(API_KEY_HEADER, api_key)
        .body(Full::new(Bytes::from(body)))?;
    Ok(req)
}

impl<S> Service<GeminiRequest> for GeminiService<S>
where
    S: Service<HttpRequest, Response = HttpResponse> + Clone + Send + 'static,
    S::Future: Send,
    S::Error: std::error::Error + Send + Sync + 'static,
{
    type Response = String;
    type Error = GeminiError;
    type Future = ResponseFuture<Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner
            .poll_ready(cx)
            .map_err(|err| GeminiError::UpstreamService(Box::new(err)))
    }

    fn call(&mut self, req: GeminiRequest) -> Self::Future {
        let mut client = explorer_tower::take_ready_service::<_, HttpRequest>(&mut self.inner);
        let uri = self.generate_content_uri();
        let model = self.model.clone();

        Box::pin(async move {
            let req = build_request(uri?, req)?;
            tracing::debug!(%model, "requesting generated content");
            let resp = client
                .call(req)
                .await
                .map_err(|err| GeminiError::UpstreamService(Box::new(err)))?;
            let status_code = resp.status();
            let mut body = resp.into_body();
            let data = explorer_http::body::body_to_bytes(&mut body)
                .await
                .map_err(|err| GeminiError::UpstreamService(Box::new(err)))?;
            let response: GenerateContentResponse =
                serde_json::from_slice(&data).map_err(|error| GeminiError::Deserialization {
                    error,
                    data: data.clone(),
                    status_code,
                })?;
            response
                .into_text()
                .map_err(|reason| GeminiError::NoText { reason })
        })
    }
}
