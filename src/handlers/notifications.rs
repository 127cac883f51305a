use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common::{created, ok, ok_with_message, ValidatedJson};
use crate::{
    entities::notification,
    errors::ServiceError,
    handlers::AppState,
    services::notifications::CreateNotificationInput,
    ApiResponse, ApiResult,
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserNotificationsQuery {
    #[serde(default)]
    pub unread_only: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UnreadCount {
    pub user_id: i32,
    pub unread: u64,
}

#[utoipa::path(
    post,
    path = "/api/notificaciones",
    request_body = CreateNotificationInput,
    responses(
        (status = 201, description = "Notification created", body = ApiResponse<notification::Model>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "User not found", body = crate::errors::ErrorResponse)
    ),
    tag = "notifications"
)]
pub async fn create_notification(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateNotificationInput>,
) -> Result<(StatusCode, Json<ApiResponse<notification::Model>>), ServiceError> {
    Ok(created(
        state.services.notifications.create_from_input(payload).await?,
    ))
}

/// Most recent notifications across all users
#[utoipa::path(
    get,
    path = "/api/notificaciones/recientes",
    responses((status = 200, description = "Recent notifications", body = ApiResponse<Vec<notification::Model>>)),
    tag = "notifications"
)]
pub async fn recent_notifications(
    State(state): State<AppState>,
) -> ApiResult<Vec<notification::Model>> {
    Ok(ok(state.services.notifications.recent().await?))
}

#[utoipa::path(
    get,
    path = "/api/notificaciones/usuario/{user_id}",
    params(("user_id" = i32, Path, description = "User ID"), UserNotificationsQuery),
    responses((status = 200, description = "Notifications for the user", body = ApiResponse<Vec<notification::Model>>)),
    tag = "notifications"
)]
pub async fn user_notifications(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
    Query(query): Query<UserNotificationsQuery>,
) -> ApiResult<Vec<notification::Model>> {
    Ok(ok(state
        .services
        .notifications
        .list_by_user(user_id, query.unread_only)
        .await?))
}

#[utoipa::path(
    get,
    path = "/api/notificaciones/usuario/{user_id}/count",
    params(("user_id" = i32, Path, description = "User ID")),
    responses((status = 200, description = "Unread count", body = ApiResponse<UnreadCount>)),
    tag = "notifications"
)]
pub async fn unread_count(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> ApiResult<UnreadCount> {
    let unread = state.services.notifications.count_unread(user_id).await?;
    Ok(ok(UnreadCount { user_id, unread }))
}

#[utoipa::path(
    put,
    path = "/api/notificaciones/usuario/{user_id}/read-all",
    params(("user_id" = i32, Path, description = "User ID")),
    responses((status = 200, description = "Number of notifications marked as read")),
    tag = "notifications"
)]
pub async fn mark_all_as_read(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> ApiResult<u64> {
    let updated = state.services.notifications.mark_all_as_read(user_id).await?;
    Ok(ok_with_message(updated, "Notifications marked as read"))
}

#[utoipa::path(
    put,
    path = "/api/notificaciones/{id}/read",
    params(("id" = i32, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification marked as read", body = ApiResponse<notification::Model>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "notifications"
)]
pub async fn mark_as_read(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<notification::Model> {
    Ok(ok(state.services.notifications.mark_as_read(id).await?))
}

#[utoipa::path(
    delete,
    path = "/api/notificaciones/{id}",
    params(("id" = i32, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification deleted"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "notifications"
)]
pub async fn delete_notification(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<i32> {
    state.services.notifications.delete(id).await?;
    Ok(ok_with_message(id, "Notification deleted"))
}

pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_notification))
        .route("/recientes", get(recent_notifications))
        .route("/usuario/:user_id", get(user_notifications))
        .route("/usuario/:user_id/count", get(unread_count))
        .route("/usuario/:user_id/read-all", put(mark_all_as_read))
        .route("/:id/read", put(mark_as_read))
        .route("/:id", delete(delete_notification))
}
