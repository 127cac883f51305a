use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use super::common::{created, ok, ok_with_message, ValidatedJson};
use crate::{
    entities::{part, provider},
    errors::ServiceError,
    handlers::AppState,
    services::providers::{CreateProviderInput, UpdateProviderInput},
    ApiResponse, ApiResult,
};

#[utoipa::path(
    get,
    path = "/api/Proveedor",
    responses((status = 200, description = "Providers listed", body = ApiResponse<Vec<provider::Model>>)),
    tag = "providers"
)]
pub async fn list_providers(State(state): State<AppState>) -> ApiResult<Vec<provider::Model>> {
    Ok(ok(state.services.providers.list_providers().await?))
}

#[utoipa::path(
    post,
    path = "/api/Proveedor",
    request_body = CreateProviderInput,
    responses(
        (status = 201, description = "Provider created", body = ApiResponse<provider::Model>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "providers"
)]
pub async fn create_provider(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateProviderInput>,
) -> Result<(StatusCode, Json<ApiResponse<provider::Model>>), ServiceError> {
    Ok(created(
        state.services.providers.create_provider(payload).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/Proveedor/{id}",
    params(("id" = i32, Path, description = "Provider ID")),
    responses(
        (status = 200, description = "Provider returned", body = ApiResponse<provider::Model>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "providers"
)]
pub async fn get_provider(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<provider::Model> {
    Ok(ok(state.services.providers.get_provider(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/Proveedor/{id}",
    params(("id" = i32, Path, description = "Provider ID")),
    request_body = UpdateProviderInput,
    responses(
        (status = 200, description = "Provider updated", body = ApiResponse<provider::Model>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "providers"
)]
pub async fn update_provider(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateProviderInput>,
) -> ApiResult<provider::Model> {
    Ok(ok(state.services.providers.update_provider(id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/Proveedor/{id}",
    params(("id" = i32, Path, description = "Provider ID")),
    responses(
        (status = 200, description = "Provider deleted"),
        (status = 400, description = "Provider still supplies parts", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "providers"
)]
pub async fn delete_provider(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<i32> {
    state.services.providers.delete_provider(id).await?;
    Ok(ok_with_message(id, "Provider deleted"))
}

/// Parts supplied by a provider
#[utoipa::path(
    get,
    path = "/api/Proveedor/{id}/repuestos",
    params(("id" = i32, Path, description = "Provider ID")),
    responses(
        (status = 200, description = "Parts listed", body = ApiResponse<Vec<part::Model>>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "providers"
)]
pub async fn provider_parts(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Vec<part::Model>> {
    Ok(ok(state.services.providers.list_parts(id).await?))
}

pub fn provider_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_providers).post(create_provider))
        .route(
            "/:id",
            get(get_provider).put(update_provider).delete(delete_provider),
        )
        .route("/:id/repuestos", get(provider_parts))
}
