use axum::{
    body::Body,
    extract::{Path, State},
    http::{Request, StatusCode},
    Json,
};
use chrono::NaiveDate;
use serde_json::json;
use tower::ServiceExt;
use wiremock::{MockServer, Mock, ResponseTemplate};
use wiremock::matchers::{body_json, method, path, query_param};
use uuid::Uuid;

use medical_order_cell::handlers::*;
use medical_order_cell::{medical_order_routes, CreateMedicalOrderRequest};
use shared_utils::test_utils::{TestConfig, MockSupabaseResponses, with_json};

fn order_request(appointment_id: Uuid, medication_ids: Option<Vec<Uuid>>) -> CreateMedicalOrderRequest {
    CreateMedicalOrderRequest {
        appointment_id,
        description: "Perform complete blood tests".to_string(),
        expiration_date: NaiveDate::from_ymd_opt(2025, 11, 15).unwrap(),
        specialty: "Clinical Laboratory".to_string(),
        medication_ids,
    }
}

#[tokio::test]
async fn test_create_order_links_existing_medications() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_database(&mock_server.uri()).to_arc();
    let appointment_id = Uuid::new_v4();
    let order_id = Uuid::new_v4();
    let medication_id = Uuid::new_v4();
    let unknown_medication = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/medications"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::medication_response(&medication_id.to_string(), "Ibuprofen")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/medical_orders"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::medical_order_response(&order_id.to_string(), &appointment_id.to_string())
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/medical_order_medications"))
        .and(body_json(json!([{ "order_id": order_id, "medication_id": medication_id }])))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            { "order_id": order_id, "medication_id": medication_id }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = order_request(appointment_id, Some(vec![medication_id, unknown_medication]));
    let Json(body) = create_medical_order(State(config), with_json(request)).await.unwrap();

    assert_eq!(body["id"], order_id.to_string());
    assert_eq!(body["medications"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["medications"][0]["name"], "Ibuprofen");
}

#[tokio::test]
async fn test_failed_medication_link_removes_the_order() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_database(&mock_server.uri()).to_arc();
    let appointment_id = Uuid::new_v4();
    let order_id = Uuid::new_v4();
    let medication_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/medications"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::medication_response(&medication_id.to_string(), "Ibuprofen")
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/medical_orders"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::medical_order_response(&order_id.to_string(), &appointment_id.to_string())
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/medical_order_medications"))
        .respond_with(ResponseTemplate::new(500).set_body_string("link table unavailable"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/medical_orders"))
        .and(query_param("id", format!("eq.{}", order_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": order_id }])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = order_request(appointment_id, Some(vec![medication_id]));
    let err = create_medical_order(State(config), with_json(request)).await.unwrap_err();

    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(err.code(), "MEDICAL_ORDER_CREATION_FAILED");
}

#[tokio::test]
async fn test_create_order_without_medications_skips_links() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_database(&mock_server.uri()).to_arc();
    let appointment_id = Uuid::new_v4();
    let order_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/rest/v1/medical_orders"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::medical_order_response(&order_id.to_string(), &appointment_id.to_string())
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/medical_order_medications"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&mock_server)
        .await;

    let Json(body) = create_medical_order(State(config), with_json(order_request(appointment_id, None)))
        .await
        .unwrap();

    assert_eq!(body["appointment_id"], appointment_id.to_string());
    assert_eq!(body["medications"], json!([]));
}

#[tokio::test]
async fn test_create_order_failure_is_internal() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_database(&mock_server.uri()).to_arc();

    Mock::given(method("POST"))
        .and(path("/rest/v1/medical_orders"))
        .respond_with(ResponseTemplate::new(409).set_body_json(
            MockSupabaseResponses::error_response("violates foreign key constraint", "23503"),
        ))
        .mount(&mock_server)
        .await;

    let err = create_medical_order(State(config), with_json(order_request(Uuid::new_v4(), None)))
        .await
        .unwrap_err();

    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(err.code(), "MEDICAL_ORDER_CREATION_FAILED");
}

#[tokio::test]
async fn test_list_orders_for_appointment() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_database(&mock_server.uri()).to_arc();
    let appointment_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/medical_orders"))
        .and(query_param("appointment_id", format!("eq.{}", appointment_id)))
        .and(query_param("order", "created_at.desc"))
        .and(query_param("select", "*,medications(*)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::medical_order_response(&Uuid::new_v4().to_string(), &appointment_id.to_string()),
            MockSupabaseResponses::medical_order_response(&Uuid::new_v4().to_string(), &appointment_id.to_string()),
        ])))
        .mount(&mock_server)
        .await;

    let Json(body) = list_appointment_orders(State(config), Path(appointment_id.to_string()))
        .await
        .unwrap();

    assert_eq!(body.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_get_missing_order_is_404() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_database(&mock_server.uri()).to_arc();

    Mock::given(method("GET"))
        .and(path("/rest/v1/medical_orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let err = get_medical_order(State(config), Path(Uuid::new_v4().to_string()))
        .await
        .unwrap_err();

    assert_eq!(err.status(), StatusCode::NOT_FOUND);
    assert_eq!(err.code(), "MEDICAL_ORDER_NOT_FOUND");
}

#[tokio::test]
async fn test_routes_reject_anonymous_requests() {
    let app = medical_order_routes(TestConfig::default().to_arc());

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/appointment/{}", Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
