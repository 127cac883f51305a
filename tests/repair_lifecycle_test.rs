//! End-to-end repair request lifecycle:
//! PENDING -> TECHNICIAN_ASSIGNED -> PRE_FINALIZED -> FINALIZED

mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::{json, Value};

struct Shop {
    app: TestApp,
    client: i64,
    technician: i64,
    machine: i64,
}

async fn shop() -> Shop {
    let app = TestApp::new().await;
    app.create_user("admin", "Administrator").await;
    let client = app.create_user("cliente", "Client").await;
    let technician = app.create_user("tecnico", "Technician").await;
    let machine = app.create_machine("Lavadora 7").await;
    Shop {
        app,
        client,
        technician,
        machine,
    }
}

async fn open_request(shop: &Shop) -> (i64, Value) {
    let (status, body) = shop
        .app
        .call(
            Method::POST,
            "/api/SolicitudReparacion",
            Some(json!({
                "client_id": shop.client,
                "machine_id": shop.machine,
                "fault_description": "No centrifuga",
                "severity": "grave",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    (body["data"]["request"]["id"].as_i64().unwrap(), body)
}

#[tokio::test]
async fn request_walks_through_every_state() {
    let shop = shop().await;
    let (id, created) = open_request(&shop).await;
    assert_eq!(created["data"]["request"]["state"], "PENDING");
    assert_eq!(created["data"]["notifications"]["delivered"].as_array().unwrap().len(), 1);

    let (status, body) = shop
        .app
        .call(
            Method::PUT,
            &format!("/api/SolicitudReparacion/{id}/assign"),
            Some(json!({
                "technician_id": shop.technician,
                "scheduled_at": "2030-05-01T09:00:00Z",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["request"]["state"], "TECHNICIAN_ASSIGNED");
    assert_eq!(body["data"]["request"]["technician_id"], shop.technician);

    let (status, body) = shop
        .app
        .call(
            Method::PUT,
            &format!("/api/SolicitudReparacion/{id}/repair-done"),
            Some(json!({ "observations": "Se cambió la correa" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["request"]["state"], "PRE_FINALIZED");

    let (status, body) = shop
        .app
        .call(Method::PUT, &format!("/api/SolicitudReparacion/{id}/finalize"), None)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["request"]["state"], "FINALIZED");

    let (_, client_inbox) = shop
        .app
        .call(Method::GET, &format!("/api/notificaciones/usuario/{}", shop.client), None)
        .await;
    assert!(!client_inbox["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn out_of_order_transitions_are_rejected_without_changes() {
    let shop = shop().await;
    let (id, _) = open_request(&shop).await;

    let (status, body) = shop
        .app
        .call(Method::PUT, &format!("/api/SolicitudReparacion/{id}/finalize"), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = shop
        .app
        .call(
            Method::PUT,
            &format!("/api/SolicitudReparacion/{id}/repair-done"),
            Some(json!({ "observations": "listo" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, current) = shop
        .app
        .call(Method::GET, &format!("/api/SolicitudReparacion/{id}"), None)
        .await;
    assert_eq!(current["data"]["state"], "PENDING");
}

#[tokio::test]
async fn assigning_a_non_technician_fails() {
    let shop = shop().await;
    let (id, _) = open_request(&shop).await;

    let (status, _) = shop
        .app
        .call(
            Method::PUT,
            &format!("/api/SolicitudReparacion/{id}/assign"),
            Some(json!({
                "technician_id": shop.client,
                "scheduled_at": "2030-05-01T09:00:00Z",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn listing_filters_by_state() {
    let shop = shop().await;
    let (first, _) = open_request(&shop).await;
    let (second, _) = open_request(&shop).await;

    shop.app
        .call(
            Method::PUT,
            &format!("/api/SolicitudReparacion/{second}/assign"),
            Some(json!({
                "technician_id": shop.technician,
                "scheduled_at": "2030-05-01T09:00:00Z",
            })),
        )
        .await;

    let (status, body) = shop
        .app
        .call(Method::GET, "/api/SolicitudReparacion?state=PENDING", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|request| request["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![first]);
}
