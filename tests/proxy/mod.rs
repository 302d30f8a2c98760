mod account_name;
mod query;
mod root;

use std::time::Duration;

use axum::{Router, body::Body};
use bytes::Bytes;
use camino::Utf8PathBuf;
use http::{HeaderMap, Request, StatusCode, header::CONTENT_TYPE};
use http_body_util::BodyExt;
use httpmock::MockServer;
use log_explorer::server::{AppState, ProxyConfig, router};
use serde_json::Value;
use tower::ServiceExt;
use url::Url;

pub const NERDGRAPH_PATH: &str = "/graphql";
pub const GEMINI_KEY: &str = "AIzaSyD-test-key";
pub const GEMINI_MODEL: &str = "gemini-test";
pub const GEMINI_PATH: &str = "/v1beta/models/gemini-test:generateContent";

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

pub fn config(
    server: &MockServer,
    gemini_api_key: Option<&str>,
    html_file: Option<Utf8PathBuf>,
) -> ProxyConfig {
    ProxyConfig::builder()
        .nerdgraph_url(Url::parse(&server.url(NERDGRAPH_PATH)).unwrap())
        .gemini_url(Url::parse(&server.url("/v1beta")).unwrap())
        .gemini_model(GEMINI_MODEL.to_string())
        .and_gemini_api_key(gemini_api_key.map(str::to_string))
        .and_html_file(html_file)
        .upstream_timeout(Duration::from_millis(500))
        .ai_timeout(Duration::from_millis(500))
        .build()
        .unwrap()
}

pub fn app(config: ProxyConfig) -> Router {
    router(AppState::new(config).unwrap())
}

pub async fn send(app: Router, request: Request<Body>) -> TestResponse {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    TestResponse {
        status,
        headers,
        body,
    }
}

pub async fn post_json(app: Router, path: &str, body: &Value) -> TestResponse {
    let request = Request::post(path)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}
