use std::time::{Duration, Instant};

use axum::body::Body;
use http::{Request, StatusCode, header::CONTENT_TYPE};
use httpmock::{Method::POST, MockServer};
use log_explorer::server::ProxyConfig;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
};
use url::Url;

use super::{NERDGRAPH_PATH, app, config, post_json, send};

#[rstest]
#[case::absent(json!({ "query": "{ actor { user { name } } }" }))]
#[case::empty(json!({ "apiKey": "", "query": "{ actor { user { name } } }" }))]
#[case::null(json!({ "apiKey": null }))]
#[tokio::test]
async fn missing_api_key_never_reaches_nerdgraph(#[case] body: Value) {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(POST).path(NERDGRAPH_PATH);
        then.status(200).json_body(json!({ "data": {} }));
    });

    let response = post_json(app(config(&server, None, None)), "/query", &body).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json(),
        json!({ "error": "API Key is missing in the request." })
    );
    mock.assert_calls(0);
}

#[tokio::test]
async fn relays_the_nerdgraph_response() {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path(NERDGRAPH_PATH)
            .header("API-Key", "NRAK-test")
            .header("content-type", "application/json")
            .json_body(json!({
                "query": "query($id: Int!) { actor { account(id: $id) { name } } }",
                "variables": { "id": 1 }
            }));
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({ "data": { "x": 1 } }));
    });

    let response = post_json(
        app(config(&server, None, None)),
        "/query",
        &json!({
            "apiKey": "NRAK-test",
            "query": "query($id: Int!) { actor { account(id: $id) { name } } }",
            "variables": { "id": 1 }
        }),
    )
    .await;

    mock.assert_calls(1);
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!({ "data": { "x": 1 } }));
}

#[tokio::test]
async fn absent_query_and_variables_are_forwarded_as_null() {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path(NERDGRAPH_PATH)
            .json_body(json!({ "query": null, "variables": null }));
        then.status(200)
            .json_body(json!({ "errors": [{ "message": "no query" }] }));
    });

    let response = post_json(
        app(config(&server, None, None)),
        "/query",
        &json!({ "apiKey": "NRAK-test" }),
    )
    .await;

    mock.assert_calls(1);
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json(),
        json!({ "errors": [{ "message": "no query" }] })
    );
}

#[rstest]
#[case::server_error(500, None)]
#[case::unauthorized(401, None)]
#[case::too_slow(200, Some(Duration::from_secs(2)))]
#[tokio::test]
async fn upstream_failures_become_503(#[case] status: u16, #[case] delay: Option<Duration>) {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(POST).path(NERDGRAPH_PATH);
        let then = then
            .status(status)
            .json_body(json!({ "errors": [{ "message": "upstream detail" }] }));
        if let Some(delay) = delay {
            then.delay(delay);
        }
    });

    let response = post_json(
        app(config(&server, None, None)),
        "/query",
        &json!({ "apiKey": "NRAK-test", "query": "{ actor { user { name } } }" }),
    )
    .await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        response.json(),
        json!({ "error": "A network error occurred while contacting New Relic." })
    );
}

#[tokio::test]
async fn unreachable_nerdgraph_becomes_503() {
    // nothing listens on port 9 of the loopback interface
    let config = ProxyConfig::builder()
        .nerdgraph_url(Url::parse("http://127.0.0.1:9/graphql").unwrap())
        .build()
        .unwrap();

    let response = post_json(
        app(config),
        "/query",
        &json!({ "apiKey": "NRAK-test", "query": "{ actor { user { name } } }" }),
    )
    .await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn stalled_nerdgraph_body_becomes_503() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    // headers arrive at once, the body never finishes
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let _ = socket.read(&mut buf).await;
        socket
            .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 16\r\n\r\n{\"data\"")
            .await
            .unwrap();
        socket.flush().await.unwrap();
        tokio::time::sleep(Duration::from_secs(3)).await;
    });
    let config = ProxyConfig::builder()
        .nerdgraph_url(Url::parse(&format!("http://{addr}/graphql")).unwrap())
        .upstream_timeout(Duration::from_millis(300))
        .build()
        .unwrap();

    let started = Instant::now();
    let response = post_json(
        app(config),
        "/query",
        &json!({ "apiKey": "NRAK-test", "query": "{ actor { user { name } } }" }),
    )
    .await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        response.json(),
        json!({ "error": "A network error occurred while contacting New Relic." })
    );
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[rstest]
#[case::not_json("text/plain", "apiKey=NRAK-test", StatusCode::UNSUPPORTED_MEDIA_TYPE)]
#[case::malformed("application/json", "{\"apiKey\":", StatusCode::BAD_REQUEST)]
#[case::wrong_shape("application/json", "[1, 2, 3]", StatusCode::UNPROCESSABLE_ENTITY)]
#[tokio::test]
async fn unusable_bodies_are_rejected(
    #[case] content_type: &str,
    #[case] body: &'static str,
    #[case] expected: StatusCode,
) {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(POST).path(NERDGRAPH_PATH);
        then.status(200).json_body(json!({ "data": {} }));
    });
    let request = Request::post("/query")
        .header(CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .unwrap();

    let response = send(app(config(&server, None, None)), request).await;

    assert_eq!(response.status, expected);
    assert!(response.json()["error"].is_string());
    mock.assert_calls(0);
}
