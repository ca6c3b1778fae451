use std::time::Duration;

use assert_matches::assert_matches;
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use wiremock::{MockServer, Mock, ResponseTemplate};
use wiremock::matchers::{body_json, header, method, path, query_param};

use shared_config::{AppConfig, Environment};
use shared_database::{DatabaseError, SupabaseClient};

#[derive(Debug, Deserialize, PartialEq)]
struct Row {
    id: u32,
    name: String,
}

fn config_for(server: &MockServer) -> AppConfig {
    AppConfig {
        environment: Environment::Test,
        port: 0,
        api_prefix: "api/v1".to_string(),
        supabase_url: server.uri(),
        supabase_service_key: "service-key".to_string(),
        jwt_secret: "secret".to_string(),
        jwt_expiration: Duration::from_secs(3600),
    }
}

#[tokio::test]
async fn test_request_sends_service_key_and_decodes_rows() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/things"))
        .and(query_param("id", "eq.1"))
        .and(header("apikey", "service-key"))
        .and(header("authorization", "Bearer service-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "name": "first" }
        ])))
        .mount(&mock_server)
        .await;

    let client = SupabaseClient::new(&config_for(&mock_server));
    let rows: Vec<Row> = client
        .request(Method::GET, "/rest/v1/things?id=eq.1", None)
        .await
        .unwrap();

    assert_eq!(rows, vec![Row { id: 1, name: "first".to_string() }]);
}

#[tokio::test]
async fn test_insert_asks_for_representation() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/things"))
        .and(header("prefer", "return=representation"))
        .and(body_json(json!({ "name": "new" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            { "id": 7, "name": "new" }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = SupabaseClient::new(&config_for(&mock_server));
    let row: Row = client.insert("things", json!({ "name": "new" })).await.unwrap();

    assert_eq!(row.id, 7);
}

#[tokio::test]
async fn test_insert_with_empty_representation_fails() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/things"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let client = SupabaseClient::new(&config_for(&mock_server));
    let result: Result<Row, _> = client.insert("things", json!({ "name": "new" })).await;

    assert_matches!(result, Err(DatabaseError::EmptyResponse(_)));
}

#[tokio::test]
async fn test_unique_violation_is_classified() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/things"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23505",
            "message": "duplicate key value violates unique constraint \"things_name_key\""
        })))
        .mount(&mock_server)
        .await;

    let client = SupabaseClient::new(&config_for(&mock_server));
    let result: Result<Row, _> = client.insert("things", json!({ "name": "dup" })).await;

    assert_matches!(result, Err(DatabaseError::UniqueViolation(_)));
}

#[tokio::test]
async fn test_auth_and_server_failures_are_classified() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/locked"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/broken"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let client = SupabaseClient::new(&config_for(&mock_server));

    let locked: Result<Vec<Row>, _> = client.request(Method::GET, "/rest/v1/locked", None).await;
    assert_matches!(locked, Err(DatabaseError::Auth(_)));

    let broken: Result<Vec<Row>, _> = client.request(Method::GET, "/rest/v1/broken", None).await;
    assert_matches!(broken, Err(DatabaseError::Api { status: 500, .. }));
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/things"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "unexpected": true })))
        .mount(&mock_server)
        .await;

    let client = SupabaseClient::new(&config_for(&mock_server));
    let result: Result<Vec<Row>, _> = client.request(Method::GET, "/rest/v1/things", None).await;

    assert_matches!(result, Err(DatabaseError::Decode(_)));
}
