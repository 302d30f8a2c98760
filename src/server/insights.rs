//! `/gemini-insights`: log sample in, Gemini's analysis out

use axum::{Json, extract::State};
use bytes::Bytes;
use explorer_gemini::GeminiRequest;
use http::{HeaderMap, header::CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tower::ServiceExt;

use crate::{
    ProxyError,
    prompt::{build_prompt, custom_instructions},
    server::AppState,
};

/// JSON form of the request; a non-JSON body is taken as the log sample itself
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct InsightsRequest {
    #[serde(default, rename = "csvData", alias = "csv_data")]
    csv_data: Option<String>,
    #[serde(default)]
    prompt: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InsightsResponse {
    pub insights: String,
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|mime| {
            let mime = mime.trim();
            mime.eq_ignore_ascii_case("application/json") || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

impl InsightsRequest {
    pub fn from_body(headers: &HeaderMap, body: &[u8]) -> Result<InsightsRequest, ProxyError> {
        if is_json(headers) {
            serde_json::from_slice(body).map_err(|err| {
                ProxyError::invalid_body(format!("Failed to parse the request body as JSON: {err}"))
            })
        } else {
            let csv_data = std::str::from_utf8(body)
                .map_err(|_| ProxyError::invalid_body("Log data must be UTF-8 text."))?;
            Ok(InsightsRequest {
                csv_data: Some(csv_data.to_string()),
                prompt: None,
            })
        }
    }
}

pub(crate) async fn gemini_insights(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<InsightsResponse>, ProxyError> {
    let Some(api_key) = state.config().gemini_api_key().clone() else {
        return Err(ProxyError::GeminiKeyNotConfigured);
    };

    let request = InsightsRequest::from_body(&headers, &body)?;
    let csv_data = request
        .csv_data
        .filter(|data| !data.trim().is_empty())
        .ok_or(ProxyError::MissingLogData)?;

    let instructions = custom_instructions(request.prompt.as_deref());
    let prompt = build_prompt(instructions, &csv_data);
    tracing::info!(
        sample_bytes = csv_data.len(),
        custom_prompt = instructions.is_some(),
        "requesting insights"
    );

    let insights = state
        .gemini()
        .oneshot(GeminiRequest::new(prompt, api_key))
        .await
        .map_err(ProxyError::Gemini)?;
    Ok(Json(InsightsResponse { insights }))
}
