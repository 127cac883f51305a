//! Response envelope, status codes and the HTTP middleware stack.

mod common;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use common::{response_json, TestApp};
use serde_json::json;

#[tokio::test]
async fn success_envelope_carries_data_and_request_id() {
    let app = TestApp::new().await;
    let response = app.request(Method::GET, "/api/Maquina", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let header = response
        .headers()
        .get("x-request-id")
        .expect("request id header")
        .to_str()
        .unwrap()
        .to_string();
    let body = response_json(response).await;

    assert_eq!(body["success"], true);
    assert!(body["data"].is_array());
    assert!(body["timestamp"].is_string());
    assert_eq!(body["request_id"], header.as_str());
}

#[tokio::test]
async fn missing_resource_is_a_404_error_envelope() {
    let app = TestApp::new().await;
    let (status, body) = app.call(Method::GET, "/api/Usuario/999", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("999"));
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn invalid_payload_is_a_400() {
    let app = TestApp::new().await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/Usuario",
            Some(json!({
                "username": "x",
                "email": "not-an-email",
                "password": "short",
                "role": "Client",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = app
        .call(Method::POST, "/api/Maquina", Some(json!({ "name": 5 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn caller_supplied_request_id_is_echoed() {
    let app = TestApp::new().await;
    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/Proveedor")
        .header("x-request-id", "req-abc-123")
        .body(Body::empty())
        .unwrap();

    let response = app.send(request).await;
    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "req-abc-123"
    );
}

#[tokio::test]
async fn health_reports_database_up() {
    let app = TestApp::new().await;
    let (status, body) = app.call(Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "up");
    assert_eq!(body["database"], "up");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = TestApp::new().await;
    let (status, body) = app.call(Method::GET, "/api-docs/openapi.json", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/SolicitudReparacion/{id}/assign"].is_object());
}

#[tokio::test]
async fn user_delete_only_deactivates() {
    let app = TestApp::new().await;
    let id = app.create_user("tecnico", "Technician").await;

    let (status, body) = app
        .call(Method::DELETE, &format!("/api/Usuario/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, body) = app.call(Method::GET, &format!("/api/Usuario/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["active"], false);

    let (_, technicians) = app.call(Method::GET, "/api/Usuario/tecnicos", None).await;
    assert!(technicians["data"].as_array().unwrap().is_empty());
}
