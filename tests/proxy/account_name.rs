use explorer_graphql::ACCOUNT_NAME_QUERY;
use http::StatusCode;
use httpmock::{Method::POST, MockServer};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};

use super::{NERDGRAPH_PATH, app, config, post_json};

#[rstest]
#[case::no_key(json!({ "accountId": 12345 }))]
#[case::empty_key(json!({ "apiKey": "", "accountId": 12345 }))]
#[case::no_account(json!({ "apiKey": "NRAK-test" }))]
#[case::null_account(json!({ "apiKey": "NRAK-test", "accountId": null }))]
#[case::nothing(json!({}))]
#[tokio::test]
async fn key_and_account_are_both_required(#[case] body: Value) {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(POST).path(NERDGRAPH_PATH);
        then.status(200).json_body(json!({ "data": {} }));
    });

    let response = post_json(app(config(&server, None, None)), "/account-name", &body).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json(),
        json!({ "error": "API Key and Account ID are required." })
    );
    mock.assert_calls(0);
}

#[tokio::test]
async fn sends_the_account_name_query() {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path(NERDGRAPH_PATH)
            .header("API-Key", "NRAK-test")
            .json_body(json!({
                "query": ACCOUNT_NAME_QUERY,
                "variables": { "accountId": 12345 }
            }));
        then.status(200).json_body(json!({
            "data": { "actor": { "account": { "name": "Acme Production" } } }
        }));
    });

    let response = post_json(
        app(config(&server, None, None)),
        "/account-name",
        &json!({ "apiKey": "NRAK-test", "accountId": 12345 }),
    )
    .await;

    mock.assert_calls(1);
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json(),
        json!({ "data": { "actor": { "account": { "name": "Acme Production" } } } })
    );
}

#[tokio::test]
async fn upstream_failure_becomes_503() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(POST).path(NERDGRAPH_PATH);
        then.status(502).body("bad gateway");
    });

    let response = post_json(
        app(config(&server, None, None)),
        "/account-name",
        &json!({ "apiKey": "NRAK-test", "accountId": 12345 }),
    )
    .await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        response.json(),
        json!({ "error": "A network error occurred while contacting New Relic." })
    );
}
