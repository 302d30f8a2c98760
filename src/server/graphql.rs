//! `/query` and `/account-name`: both end up in [`forward_to_nerdgraph`]

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use explorer_graphql::{GraphQLPayload, NerdGraphRequest};
use http::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use tower::ServiceExt;

use crate::{ProxyError, server::AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    query: Value,
    #[serde(default)]
    variables: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountNameRequest {
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    account_id: Option<i64>,
}

fn non_empty(key: Option<String>) -> Option<String> {
    key.filter(|key| !key.is_empty())
}

pub(crate) async fn query(
    State(state): State<AppState>,
    body: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ProxyError> {
    let Json(request) = body?;
    let api_key = non_empty(request.api_key).ok_or(ProxyError::MissingApiKey)?;
    let payload = GraphQLPayload::new(request.query, request.variables);
    forward_to_nerdgraph(&state, payload, api_key).await
}

pub(crate) async fn account_name(
    State(state): State<AppState>,
    body: Result<Json<AccountNameRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ProxyError> {
    let Json(request) = body?;
    let (Some(api_key), Some(account_id)) = (non_empty(request.api_key), request.account_id)
    else {
        return Err(ProxyError::MissingAccountLookupFields);
    };
    forward_to_nerdgraph(&state, GraphQLPayload::account_name(account_id), api_key).await
}

/// Relays the upstream status and JSON body, or fails with a [`ProxyError::NerdGraph`]
pub(crate) async fn forward_to_nerdgraph(
    state: &AppState,
    payload: GraphQLPayload,
    api_key: String,
) -> Result<(StatusCode, Json<Value>), ProxyError> {
    let response = state
        .nerdgraph()
        .oneshot(NerdGraphRequest::new(payload, api_key))
        .await
        .map_err(ProxyError::NerdGraph)?;
    tracing::debug!(status = %response.status, "relaying NerdGraph response");
    Ok((response.status, Json(response.body)))
}
