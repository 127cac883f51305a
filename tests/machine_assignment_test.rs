//! A machine belongs to at most one client at a time.

mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn reassigning_moves_the_machine_between_clients() {
    let app = TestApp::new().await;
    let first = app.create_user("cliente7", "Client").await;
    let second = app.create_user("cliente9", "Client").await;
    let machine = app.create_machine("Lavadora 12").await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/Maquina-Cliente/asignar",
            Some(json!({ "client_id": first, "machine_id": machine })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, body) = app
        .call(
            Method::PUT,
            "/api/Maquina-Cliente/reasignar",
            Some(json!({
                "machine_id": machine,
                "new_client_id": second,
                "old_client_id": first,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["client_id"], second);

    let (status, current) = app
        .call(
            Method::GET,
            &format!("/api/Maquina-Cliente/cliente-actual/{machine}"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(current["data"]["client_id"], second);
    assert_eq!(current["data"]["client"]["username"], "cliente9");

    let (_, old_list) = app
        .call(
            Method::GET,
            &format!("/api/Maquina-Cliente/cliente/{first}/maquinas"),
            None,
        )
        .await;
    assert!(old_list["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn assigning_a_held_machine_to_another_client_conflicts() {
    let app = TestApp::new().await;
    let first = app.create_user("cliente7", "Client").await;
    let second = app.create_user("cliente9", "Client").await;
    let machine = app.create_machine("Lavadora 12").await;

    app.call(
        Method::POST,
        "/api/Maquina-Cliente/asignar",
        Some(json!({ "client_id": first, "machine_id": machine })),
    )
    .await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/Maquina-Cliente/asignar",
            Some(json!({ "client_id": second, "machine_id": machine })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = app
        .call(
            Method::PUT,
            "/api/Maquina-Cliente/reasignar",
            Some(json!({
                "machine_id": machine,
                "new_client_id": first,
                "old_client_id": second,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, current) = app
        .call(
            Method::GET,
            &format!("/api/Maquina-Cliente/cliente-actual/{machine}"),
            None,
        )
        .await;
    assert_eq!(current["data"]["client_id"], first);
}

#[tokio::test]
async fn unassigned_machine_has_no_current_client() {
    let app = TestApp::new().await;
    let client = app.create_user("cliente", "Client").await;
    let machine = app.create_machine("Secadora 1").await;

    app.call(
        Method::POST,
        "/api/Maquina-Cliente/asignar",
        Some(json!({ "client_id": client, "machine_id": machine })),
    )
    .await;

    let (status, _) = app
        .call(
            Method::DELETE,
            &format!("/api/Maquina-Cliente/desasignar/{machine}"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .call(
            Method::GET,
            &format!("/api/Maquina-Cliente/cliente-actual/{machine}"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
