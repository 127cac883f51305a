//! Repair-shop API library
//!
//! Backend for a maintenance workshop: users, machines and their client
//! assignments, providers and parts, repair requests, receipts and in-app
//! notifications.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod health;
pub mod middleware_helpers;
pub mod migrator;
pub mod notifications;
pub mod openapi;
pub mod repositories;
pub mod services;
pub mod tracing;

#[cfg(test)]
pub(crate) mod test_support;

use axum::{response::Json, Router};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::{sync::Arc, time::Duration};
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::ToSchema;

use crate::notifications::Mailer;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub services: handlers::AppServices,
}

impl AppState {
    /// Wires every service over one connection pool and mailer
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: config::AppConfig,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let services = handlers::AppServices::new(db.clone(), mailer, &config);
        Self {
            db,
            config,
            services,
        }
    }
}

/// Success envelope shared by every endpoint; failures use
/// [`errors::ErrorResponse`], which carries the same `success`, `message`,
/// `request_id` and `timestamp` keys.
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub meta: ResponseMeta,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            meta: ResponseMeta::capture(),
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::success(data)
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// Every `/api` resource, unlayered
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/api/Usuario", handlers::users::user_routes())
        .nest("/api/Maquina", handlers::machines::machine_routes())
        .nest(
            "/api/Maquina-Cliente",
            handlers::machine_assignments::assignment_routes(),
        )
        .nest("/api/Proveedor", handlers::providers::provider_routes())
        .nest("/api/repuestos", handlers::parts::part_routes())
        .nest("/api/Recibo", handlers::receipts::receipt_routes())
        .nest(
            "/api/Lote-Recibo",
            handlers::receipt_batches::receipt_batch_routes(),
        )
        .nest(
            "/api/SolicitudReparacion",
            handlers::repair_requests::repair_request_routes(),
        )
        .nest(
            "/api/notificaciones",
            handlers::notifications::notification_routes(),
        )
        .nest("/api/auth", handlers::auth::auth_routes())
}

/// The complete application: API, health, docs and the HTTP middleware stack
pub fn app_router(state: AppState, cors: CorsLayer) -> Router {
    let request_timeout = Duration::from_secs(state.config.request_timeout_secs);

    Router::new()
        .merge(api_routes())
        .merge(health::health_routes())
        .merge(openapi::swagger_ui())
        .layer(TraceLayer::new_for_http().make_span_with(crate::tracing::RequestSpanMaker))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state)
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn success_envelope_is_flat_and_carries_request_id() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-123"), async {
                ApiResponse::success("ok")
            })
            .await;

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], "ok");
        assert_eq!(json["request_id"], "meta-123");
        assert!(json.get("message").is_none());
        DateTime::parse_from_rfc3339(json["timestamp"].as_str().unwrap())
            .expect("timestamp should parse");
    }

    #[test]
    fn message_is_included_when_set() {
        let json = serde_json::to_value(ApiResponse::with_message(3, "done")).unwrap();
        assert_eq!(json["message"], "done");
        assert_eq!(json["data"], 3);
        assert!(json.get("request_id").is_none());
    }
}
