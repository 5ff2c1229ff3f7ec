//! Integration tests for the sync client over real HTTP
//!
//! These tests run `SyncClient` against `ReqwestEnvironmentApi` and a mock
//! backend, checking the exact request sequence each operation produces.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use secretly_application::{ApiError, ApplicationError, SyncClient};
use secretly_domain::{EnvironmentId, RowState, VariableId};
use secretly_infrastructure::{ClientConfig, ReqwestEnvironmentApi};

fn client_for(server: &MockServer) -> SyncClient<ReqwestEnvironmentApi> {
    let config = ClientConfig::default()
        .with_base_url(&format!("{}/api/v1", server.uri()))
        .expect("mock server URI is valid");
    let api = ReqwestEnvironmentApi::new(&config).expect("Failed to build client");
    SyncClient::new(Arc::new(api))
}

fn list_body(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "data": data,
        "code": 200,
        "message": "Environments retrieved",
        "error": ""
    }))
}

fn summarize(requests: &[Request]) -> Vec<String> {
    requests
        .iter()
        .map(|r| format!("{} {}", r.method, r.url.path()))
        .collect()
}

#[tokio::test]
async fn test_create_then_reload() {
    let server = MockServer::start().await;

    // First listing is empty, every later one returns the created row.
    Mock::given(method("GET"))
        .and(path("/api/v1/env"))
        .respond_with(list_body(json!([])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/env"))
        .respond_with(list_body(json!([
            {"id": 1, "name": "dev", "values": [{"id": 10, "key": "PORT", "value": "8080"}]}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/env"))
        .and(body_json(json!({"name": "dev", "values": [{"key": "PORT", "value": "8080"}]})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": {"id": 1, "name": "dev"},
            "code": 201,
            "message": "Environment created",
            "error": ""
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    client.load_all().await.unwrap();
    assert!(client.rows().is_empty());

    let row = client.add_environment_row("dev");
    client.set_variable(row, "PORT", "8080").unwrap();
    let saved = client
        .create_or_update_environment(row)
        .await
        .unwrap()
        .expect("created environment is in the reloaded mirror");

    assert_eq!(saved.id, Some(EnvironmentId(1)));
    assert_eq!(saved.variables[0].id, Some(VariableId(10)));
    assert_eq!(client.rows().len(), 1);
    assert_eq!(client.rows()[0].state, RowState::Saved);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(
        summarize(&requests),
        vec!["GET /api/v1/env", "POST /api/v1/env", "GET /api/v1/env"]
    );
}

#[tokio::test]
async fn test_update_sends_variable_ids() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/env"))
        .respond_with(list_body(json!([
            {"id": 4, "name": "staging", "values": [{"id": 40, "key": "HOST", "value": "a"}]}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/env/4"))
        .and(body_json(json!({
            "name": "staging",
            "values": [{"id": 40, "key": "HOST", "value": "b"}, {"key": "PORT", "value": "1"}]
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    client.load_all().await.unwrap();
    let row = client.rows()[0].key;
    client.set_variable(row, "HOST", "b").unwrap();
    client.set_variable(row, "PORT", "1").unwrap();

    client.create_or_update_environment(row).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(
        summarize(&requests),
        vec!["GET /api/v1/env", "PUT /api/v1/env/4", "GET /api/v1/env"]
    );
}

#[tokio::test]
async fn test_failed_delete_restores_row() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/env"))
        .respond_with(list_body(json!([{"id": 7, "name": "prod", "values": []}])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/env/7"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "data": null,
            "code": 500,
            "error": "Failed to delete environment"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    client.load_all().await.unwrap();
    let row = client.rows()[0].key;

    let err = client.delete_environment(row).await.unwrap_err();
    assert!(matches!(
        err,
        ApplicationError::Delete(ApiError::Status { status: 500, .. })
    ));
    assert_eq!(client.rows()[0].state, RowState::Saved);
    assert!(client.rows()[0].state.is_visible());

    // No reload after a failed mutation.
    let requests = server.received_requests().await.unwrap();
    assert_eq!(
        summarize(&requests),
        vec!["GET /api/v1/env", "DELETE /api/v1/env/7"]
    );
}

#[tokio::test]
async fn test_delete_variable_then_reload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/env"))
        .respond_with(list_body(json!([
            {"id": 2, "name": "dev", "values": [{"id": 5, "key": "TOKEN", "value": "t"}]}
        ])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/env"))
        .respond_with(list_body(json!([{"id": 2, "name": "dev", "values": []}])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/env/2/value/5"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    client.load_all().await.unwrap();
    let row = client.rows()[0].key;
    let variable = client.rows()[0].environment.variables[0].row;

    client.delete_variable(row, variable).await.unwrap();
    assert_eq!(client.rows()[0].environment.variable_count(), 0);
}

#[tokio::test]
async fn test_legacy_listing_is_a_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/env"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"PORT": "8080"})))
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    let err = client.load_all().await.unwrap_err();
    assert!(matches!(err, ApplicationError::Fetch(ApiError::Decode(_))));
}

#[tokio::test]
async fn test_failure_envelope_on_reload_keeps_mirror() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/env"))
        .respond_with(list_body(json!([{"id": 1, "name": "dev", "values": []}])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/env"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "code": 500,
            "error": "Failed to get environments"
        })))
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    client.load_all().await.unwrap();
    let before = client.snapshot();

    let err = client.load_all().await.unwrap_err();
    assert!(matches!(
        err,
        ApplicationError::Fetch(ApiError::Status { status: 500, .. })
    ));
    assert_eq!(client.rows().len(), 1);
    assert_eq!(client.snapshot(), before);
}

#[tokio::test]
async fn test_failure_envelope_on_create_keeps_draft() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/env"))
        .respond_with(list_body(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/env"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "code": 500,
            "error": "Failed to create environment"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    client.load_all().await.unwrap();
    let row = client.add_environment_row("dev");
    client.set_variable(row, "PORT", "8080").unwrap();

    let err = client.create_or_update_environment(row).await.unwrap_err();
    assert!(matches!(
        err,
        ApplicationError::Save(ApiError::Status { status: 500, .. })
    ));
    let draft = client.row(row).expect("draft is kept");
    assert_eq!(draft.state, RowState::Unsaved);
    assert_eq!(draft.environment.id, None);
    assert_eq!(draft.environment.variables[0].value, "8080");

    // No reload after the failed create.
    let requests = server.received_requests().await.unwrap();
    assert_eq!(
        summarize(&requests),
        vec!["GET /api/v1/env", "POST /api/v1/env"]
    );
}
