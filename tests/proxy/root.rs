use std::fs;

use axum::body::Body;
use camino::Utf8PathBuf;
use http::{
    Method, Request, StatusCode,
    header::{
        ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_REQUEST_METHOD, CONTENT_TYPE, ORIGIN,
    },
};
use httpmock::MockServer;
use log_explorer::server::static_asset::{MISSING_PAGE, find_html_file};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

use super::{NERDGRAPH_PATH, app, config, send};

fn get(path: &str) -> Request<Body> {
    Request::get(path).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn missing_page_is_a_404() {
    let server = MockServer::start_async().await;

    let response = send(app(config(&server, None, None)), get("/")).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body.as_ref(), MISSING_PAGE.as_bytes());
    assert!(
        response.headers[CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html")
    );
}

#[tokio::test]
async fn serves_the_page_found_at_startup() {
    let server = MockServer::start_async().await;
    let temp = TempDir::new().unwrap();
    let dir = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
    fs::write(dir.join("log_explorer.html"), "<html><body>explorer</body></html>").unwrap();
    let html_file = find_html_file(&dir, "log_explorer.html").unwrap();

    let response = send(app(config(&server, None, html_file)), get("/")).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body.as_ref(),
        b"<html><body>explorer</body></html>".as_slice()
    );
    assert!(
        response.headers[CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html")
    );
}

#[tokio::test]
async fn unknown_paths_are_404() {
    let server = MockServer::start_async().await;

    let response = send(app(config(&server, None, None)), get("/log_explorer.html")).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn preflight_allows_any_origin() {
    let server = MockServer::start_async().await;
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/query")
        .header(ORIGIN, "http://localhost:8000")
        .header(ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();

    let response = send(app(config(&server, None, None)), request).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn error_responses_carry_cors_headers() {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.path(NERDGRAPH_PATH);
        then.status(200);
    });
    let request = Request::post("/query")
        .header(ORIGIN, "http://localhost:8000")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "query": "{}" }).to_string()))
        .unwrap();

    let response = send(app(config(&server, None, None)), request).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    mock.assert_calls(0);
}
