#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{self, Body},
    http::{Method, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use tower_http::cors::CorsLayer;

use repairshop_api::{
    config::AppConfig,
    db,
    notifications::{EmailMessage, MailError, Mailer},
    AppState,
};

/// Mailer that keeps every message so tests can read login codes back
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<EmailMessage>>,
}

impl RecordingMailer {
    pub fn messages(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn messages_to(&self, address: &str) -> Vec<EmailMessage> {
        self.messages()
            .into_iter()
            .filter(|message| message.to == address)
            .collect()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Full application over a private in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub mailer: Arc<RecordingMailer>,
}

impl TestApp {
    pub async fn new() -> Self {
        let cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        let pool = db::connect_in_memory()
            .await
            .expect("failed to create test database");

        let mailer = Arc::new(RecordingMailer::default());
        let state = AppState::new(Arc::new(pool), cfg, mailer.clone());
        let router = repairshop_api::app_router(state.clone(), CorsLayer::permissive());

        Self {
            router,
            state,
            mailer,
        }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(serde_json::to_vec(&json).expect("serialize request body"))
            }
            None => Body::empty(),
        };

        self.send(builder.body(body).expect("build request")).await
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    /// Sends the request and returns the status with the decoded JSON body
    pub async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let response = self.request(method, uri, body).await;
        let status = response.status();
        (status, response_json(response).await)
    }

    /// Creates a user through the API and returns its id
    pub async fn create_user(&self, username: &str, role: &str) -> i64 {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/Usuario",
                Some(json!({
                    "username": username,
                    "email": format!("{username}@example.com"),
                    "password": "s3cretpass",
                    "role": role,
                    "full_name": format!("{username} test"),
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create user: {body}");
        body["data"]["id"].as_i64().expect("user id")
    }

    pub async fn create_machine(&self, name: &str) -> i64 {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/Maquina",
                Some(json!({ "name": name, "machine_type": "lavadora" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create machine: {body}");
        body["data"]["id"].as_i64().expect("machine id")
    }

    pub async fn create_part(&self, name: &str, quantity: i32) -> i64 {
        let (status, provider) = self
            .call(
                Method::POST,
                "/api/Proveedor",
                Some(json!({ "name": format!("{name} supplier") })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create provider: {provider}");

        let (status, body) = self
            .call(
                Method::POST,
                "/api/repuestos",
                Some(json!({
                    "name": name,
                    "provider_id": provider["data"]["id"],
                    "quantity": quantity,
                    "unit_price": "12.50",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create part: {body}");
        body["data"]["id"].as_i64().expect("part id")
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).expect("json response")
}
