use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use utoipa::IntoParams;

use super::common::{created, ok, ok_with_message, ValidatedJson};
use crate::{
    entities::part,
    errors::ServiceError,
    handlers::AppState,
    services::parts::{CreatePartInput, PartFilter, SetStockInput, UpdatePartInput},
    ApiResponse, ApiResult,
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LowStockQuery {
    /// Defaults to the configured low-stock threshold
    pub threshold: Option<i32>,
}

#[utoipa::path(
    get,
    path = "/api/repuestos",
    params(PartFilter),
    responses((status = 200, description = "Parts listed", body = ApiResponse<Vec<part::Model>>)),
    tag = "parts"
)]
pub async fn list_parts(
    State(state): State<AppState>,
    Query(filter): Query<PartFilter>,
) -> ApiResult<Vec<part::Model>> {
    Ok(ok(state.services.parts.list_parts(filter).await?))
}

#[utoipa::path(
    post,
    path = "/api/repuestos",
    request_body = CreatePartInput,
    responses(
        (status = 201, description = "Part created", body = ApiResponse<part::Model>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Provider not found", body = crate::errors::ErrorResponse)
    ),
    tag = "parts"
)]
pub async fn create_part(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreatePartInput>,
) -> Result<(StatusCode, Json<ApiResponse<part::Model>>), ServiceError> {
    Ok(created(state.services.parts.create_part(payload).await?))
}

/// Parts at or below the low-stock threshold
#[utoipa::path(
    get,
    path = "/api/repuestos/stock-bajo",
    params(LowStockQuery),
    responses((status = 200, description = "Low-stock parts", body = ApiResponse<Vec<part::Model>>)),
    tag = "parts"
)]
pub async fn low_stock(
    State(state): State<AppState>,
    Query(query): Query<LowStockQuery>,
) -> ApiResult<Vec<part::Model>> {
    Ok(ok(state.services.parts.low_stock(query.threshold).await?))
}

#[utoipa::path(
    get,
    path = "/api/repuestos/{id}",
    params(("id" = i32, Path, description = "Part ID")),
    responses(
        (status = 200, description = "Part returned", body = ApiResponse<part::Model>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "parts"
)]
pub async fn get_part(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<part::Model> {
    Ok(ok(state.services.parts.get_part(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/repuestos/{id}",
    params(("id" = i32, Path, description = "Part ID")),
    request_body = UpdatePartInput,
    responses(
        (status = 200, description = "Part updated", body = ApiResponse<part::Model>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "parts"
)]
pub async fn update_part(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdatePartInput>,
) -> ApiResult<part::Model> {
    Ok(ok(state.services.parts.update_part(id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/repuestos/{id}",
    params(("id" = i32, Path, description = "Part ID")),
    responses(
        (status = 200, description = "Part deleted"),
        (status = 400, description = "Part was used in repairs", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "parts"
)]
pub async fn delete_part(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<i32> {
    state.services.parts.delete_part(id).await?;
    Ok(ok_with_message(id, "Part deleted"))
}

/// Overwrite the stock level of a part
#[utoipa::path(
    put,
    path = "/api/repuestos/{id}/stock",
    params(("id" = i32, Path, description = "Part ID")),
    request_body = SetStockInput,
    responses(
        (status = 200, description = "Stock updated", body = ApiResponse<part::Model>),
        (status = 400, description = "Negative quantity", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "parts"
)]
pub async fn set_stock(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<SetStockInput>,
) -> ApiResult<part::Model> {
    Ok(ok(state.services.parts.set_stock(id, payload).await?))
}

pub fn part_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_parts).post(create_part))
        .route("/stock-bajo", get(low_stock))
        .route("/:id", get(get_part).put(update_part).delete(delete_part))
        .route("/:id/stock", put(set_stock))
}
