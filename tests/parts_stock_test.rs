//! Parts consumed by repairs come out of stock atomically.

mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;

async fn pending_request(app: &TestApp) -> i64 {
    let client = app.create_user("cliente", "Client").await;
    let machine = app.create_machine("Secadora 3").await;
    let (status, body) = app
        .call(
            Method::POST,
            "/api/SolicitudReparacion",
            Some(json!({
                "client_id": client,
                "machine_id": machine,
                "fault_description": "No calienta",
                "severity": "moderada",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["request"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn consuming_parts_decrements_stock_and_refuses_overdraw() {
    let app = TestApp::new().await;
    let request = pending_request(&app).await;
    let part = app.create_part("Correa", 5).await;

    let (status, body) = app
        .call(
            Method::POST,
            &format!("/api/SolicitudReparacion/{request}/parts"),
            Some(json!({ "part_id": part, "quantity": 3 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["quantity"], 3);

    let (_, stock) = app.call(Method::GET, &format!("/api/repuestos/{part}"), None).await;
    assert_eq!(stock["data"]["quantity"], 2);

    let (status, body) = app
        .call(
            Method::POST,
            &format!("/api/SolicitudReparacion/{request}/parts"),
            Some(json!({ "part_id": part, "quantity": 3 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["success"], false);

    let (_, stock) = app.call(Method::GET, &format!("/api/repuestos/{part}"), None).await;
    assert_eq!(stock["data"]["quantity"], 2);

    let (_, used) = app
        .call(Method::GET, &format!("/api/SolicitudReparacion/{request}/parts"), None)
        .await;
    assert_eq!(used["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn zero_quantity_is_a_validation_error() {
    let app = TestApp::new().await;
    let request = pending_request(&app).await;
    let part = app.create_part("Filtro", 4).await;

    let (status, _) = app
        .call(
            Method::POST,
            &format!("/api/SolicitudReparacion/{request}/parts"),
            Some(json!({ "part_id": part, "quantity": 0 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, stock) = app.call(Method::GET, &format!("/api/repuestos/{part}"), None).await;
    assert_eq!(stock["data"]["quantity"], 4);
}

#[tokio::test]
async fn low_stock_report_uses_the_threshold() {
    let app = TestApp::new().await;
    let scarce = app.create_part("Rodamiento", 1).await;
    app.create_part("Tornillo", 500).await;

    let (status, body) = app
        .call(Method::GET, "/api/repuestos/stock-bajo?threshold=2", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|part| part["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![scarce]);
}

#[tokio::test]
async fn setting_stock_to_zero_marks_the_part_out_of_stock() {
    let app = TestApp::new().await;
    let part = app.create_part("Bomba", 3).await;

    let (status, body) = app
        .call(
            Method::PUT,
            &format!("/api/repuestos/{part}/stock"),
            Some(json!({ "quantity": 0 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["quantity"], 0);
    assert_eq!(body["data"]["status"], "out_of_stock");
}
