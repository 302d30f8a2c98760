#![warn(missing_docs)]

//! Forwards GraphQL payloads to New Relic's NerdGraph API over an HTTP [`Service`]
//!
//! The payload is never inspected: whatever `query` and `variables` the caller
//! handed over are serialized as-is, and the upstream's JSON answer is handed
//! back untouched alongside its status.

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
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower::{Layer, Service};
use url::Url;

/// New Relic's production NerdGraph endpoint
pub const NERDGRAPH_ENDPOINT: &str = "https://api.newrelic.com/graphql";

/// Header NerdGraph reads the user key from
pub const API_KEY_HEADER: &str = "API-Key";

/// Looks up the display name of a single account
pub const ACCOUNT_NAME_QUERY: &str =
    "query($accountId: Int!) { actor { account(id: $accountId) { name } } }";

const JSON_CONTENT_TYPE: &str = "application/json";

/// Body of a GraphQL request, forwarded verbatim
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct GraphQLPayload {
    /// GraphQL document, `null` when the caller sent none
    pub query: Value,
    /// Variable bindings, `null` when the caller sent none
    pub variables: Value,
}

impl GraphQLPayload {
    /// Constructs a payload from caller-provided parts
    pub const fn new(query: Value, variables: Value) -> GraphQLPayload {
        GraphQLPayload { query, variables }
    }

    /// The fixed account-name lookup, bound to `account_id`
    pub fn account_name(account_id: i64) -> GraphQLPayload {
        GraphQLPayload {
            query: Value::String(ACCOUNT_NAME_QUERY.to_string()),
            variables: json!({ "accountId": account_id }),
        }
    }
}

/// A [`GraphQLPayload`] plus the credential it should be sent with
#[derive(Clone, PartialEq)]
pub struct NerdGraphRequest {
    payload: GraphQLPayload,
    api_key: String,
}

impl fmt::Debug for NerdGraphRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NerdGraphRequest")
            .field("payload", &self.payload)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl NerdGraphRequest {
    /// Constructs a new [`NerdGraphRequest`]
    pub fn new(payload: GraphQLPayload, api_key: impl Into<String>) -> NerdGraphRequest {
        NerdGraphRequest {
            payload,
            api_key: api_key.into(),
        }
    }

    /// The payload that will be forwarded
    pub const fn payload(&self) -> &GraphQLPayload {
        &self.payload
    }
}

/// What NerdGraph answered with
#[derive(Debug, Clone, PartialEq)]
pub struct NerdGraphResponse {
    /// Upstream status code
    pub status: StatusCode,
    /// Upstream JSON body
    pub body: Value,
}

/// Errors that may occur from using a [`NerdGraphService`]
#[derive(thiserror::Error, Debug)]
pub enum NerdGraphError {
    /// The payload could not be serialized
    #[error("Serialization error: {}", .0)]
    Serialization(serde_json::Error),
    /// The API key contains characters that cannot go in a header
    #[error("The API key is not a valid header value")]
    InvalidApiKey(#[from] InvalidHeaderValue),
    /// The upstream answered with something that is not JSON
    #[error("Could not decode the {status_code} response as JSON: {error}")]
    Deserialization {
        /// The source error
        error: serde_json::Error,
        /// The data that was attempted to be deserialized
        data: Bytes,
        /// The [`StatusCode`] of the response
        status_code: StatusCode,
    },
    /// [`http`]-related error, probably from building the request
    #[error("HTTP error: {:?}", .0)]
    Http(#[from] http::Error),
    /// Error that occurs from a failure to parse a [`Uri`] from a [`Url`]
    #[error("Unable to convert URL to URI.")]
    InvalidUri(#[from] InvalidUri),
    /// Errors that occur as a result of the underlying HTTP service failing
    #[error("Upstream service error: {}", .0)]
    UpstreamService(Box<dyn std::error::Error + Send + Sync>),
}

/// [`Layer`] that wraps an HTTP service with NerdGraph forwarding
#[derive(Clone, Debug)]
pub struct NerdGraphLayer {
    endpoint: Url,
}

impl NerdGraphLayer {
    /// Constructs a new [`NerdGraphLayer`] that posts to `endpoint`
    pub const fn new(endpoint: Url) -> NerdGraphLayer {
        NerdGraphLayer { endpoint }
    }
}

impl<S> Layer<S> for NerdGraphLayer {
    type Service = NerdGraphService<S>;
    fn layer(&self, inner: S) -> Self::Service {
        NerdGraphService::new(self.endpoint.clone(), inner)
    }
}

/// Middleware that turns a [`NerdGraphRequest`] into an authenticated POST
#[derive(Clone, Debug)]
pub struct NerdGraphService<S> {
    inner: S,
    endpoint: Url,
}

impl<S> NerdGraphService<S> {
    /// Constructs a new [`NerdGraphService`]
    pub const fn new(endpoint: Url, inner: S) -> NerdGraphService<S> {
        NerdGraphService { inner, endpoint }
    }
}

fn build_request(endpoint: &Url, req: NerdGraphRequest) -> Result<HttpRequest, NerdGraphError> {
    let mut api_key = HeaderValue::from_str(&req.api_key)?;
    api_key.set_sensitive(true);
    let body = serde_json::to_vec(&req.payload).map_err(NerdGraphError::Serialization)?;
    let req = http::Request::builder()
        .uri(Uri::from_str(endpoint.as_str())?)
        .method(Method::POST)
        .header(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))
        .header(API_KEY_HEADER, api_key)
        .body(Full::new(Bytes::from(body)))?;
    Ok(req)
}

impl<S> Service<NerdGraphRequest> for NerdGraphService<S>
where
    S: Service<HttpRequest, Response = HttpResponse> + Clone + Send + 'static,
    S::Future: Send,
    S::Error: std::error::Error + Send + Sync + 'static,
{
    type Response = NerdGraphResponse;
    type Error = NerdGraphError;
    type Future = ResponseFuture<Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner
            .poll_ready(cx)
            .map_err(|err| NerdGraphError::UpstreamService(Box::new(err)))
    }

    fn call(&mut self, req: NerdGraphRequest) -> Self::Future {
        let mut client = explorer_tower::take_ready_service::<_, HttpRequest>(&mut self.inner);
        let endpoint = self.endpoint.clone();

        Box::pin(async move {
            let req = build_request(&endpoint, req)?;
            let resp = client
                .call(req)
                .await
                .map_err(|err| NerdGraphError::UpstreamService(Box::new(err)))?;
            let status_code = resp.status();
            let mut body = resp.into_body();
            let data = explorer_http::body::body_to_bytes(&mut body)
                .await
                .map_err(|err| NerdGraphError::UpstreamService(Box::new(err)))?;
            let body = serde_json::from_slice(&data).map_err(|error| {
                NerdGraphError::Deserialization {
                    error,
                    data: data.clone(),
                    status_code,
                }
            })?;
            Ok(NerdGraphResponse {
                status: status_code,
                body,
            })
        })
    }
}
