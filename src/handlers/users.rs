use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::info;

use super::common::{created, ok, ok_with_message, ValidatedJson};
use crate::{
    entities::user,
    errors::ServiceError,
    handlers::AppState,
    services::users::{CreateUserInput, UpdateUserInput, UserFilter},
    ApiResponse, ApiResult,
};

/// List users, optionally filtered by role and active flag
#[utoipa::path(
    get,
    path = "/api/Usuario",
    params(UserFilter),
    responses(
        (status = 200, description = "Users listed", body = ApiResponse<Vec<user::Model>>),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "users"
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(filter): Query<UserFilter>,
) -> ApiResult<Vec<user::Model>> {
    let users = state.services.users.list_users(filter).await?;
    Ok(ok(users))
}

/// Create a user with any role
#[utoipa::path(
    post,
    path = "/api/Usuario",
    request_body = CreateUserInput,
    responses(
        (status = 201, description = "User created", body = ApiResponse<user::Model>,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 400, description = "Invalid request or duplicate username/email", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateUserInput>,
) -> Result<(StatusCode, Json<ApiResponse<user::Model>>), ServiceError> {
    let created_user = state.services.users.create_user(payload).await?;
    info!(user_id = created_user.id, "User created via API");
    Ok(created(created_user))
}

/// Active technicians, for assignment pickers
#[utoipa::path(
    get,
    path = "/api/Usuario/tecnicos",
    responses(
        (status = 200, description = "Technicians listed", body = ApiResponse<Vec<user::Model>>)
    ),
    tag = "users"
)]
pub async fn list_technicians(State(state): State<AppState>) -> ApiResult<Vec<user::Model>> {
    Ok(ok(state.services.users.list_technicians().await?))
}

#[utoipa::path(
    get,
    path = "/api/Usuario/{id}",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User returned", body = ApiResponse<user::Model>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "users"
)]
pub async fn get_user(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<user::Model> {
    Ok(ok(state.services.users.get_user(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/Usuario/{id}",
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateUserInput,
    responses(
        (status = 200, description = "User updated", body = ApiResponse<user::Model>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "users"
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateUserInput>,
) -> ApiResult<user::Model> {
    Ok(ok(state.services.users.update_user(id, payload).await?))
}

/// Disables the account; the row is kept for history
#[utoipa::path(
    delete,
    path = "/api/Usuario/{id}",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deactivated", body = ApiResponse<user::Model>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "users"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<user::Model> {
    let disabled = state.services.users.deactivate_user(id).await?;
    Ok(ok_with_message(disabled, "User deactivated"))
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/tecnicos", get(list_technicians))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
}
