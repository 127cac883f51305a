use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use super::common::{created, ok, ok_with_message, ValidatedJson};
use crate::{
    entities::receipt,
    errors::ServiceError,
    handlers::AppState,
    services::receipts::{CreateReceiptInput, ReceiptFilter, UpdateReceiptInput},
    ApiResponse, ApiResult,
};

#[utoipa::path(
    get,
    path = "/api/Recibo",
    params(ReceiptFilter),
    responses((status = 200, description = "Receipts listed", body = ApiResponse<Vec<receipt::Model>>)),
    tag = "receipts"
)]
pub async fn list_receipts(
    State(state): State<AppState>,
    Query(filter): Query<ReceiptFilter>,
) -> ApiResult<Vec<receipt::Model>> {
    Ok(ok(state.services.receipts.list_receipts(filter).await?))
}

/// Record a receipt; the total is computed as income minus expense
#[utoipa::path(
    post,
    path = "/api/Recibo",
    request_body = CreateReceiptInput,
    responses(
        (status = 201, description = "Receipt created", body = ApiResponse<receipt::Model>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Client or machine not found", body = crate::errors::ErrorResponse)
    ),
    tag = "receipts"
)]
pub async fn create_receipt(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateReceiptInput>,
) -> Result<(StatusCode, Json<ApiResponse<receipt::Model>>), ServiceError> {
    Ok(created(state.services.receipts.create_receipt(payload).await?))
}

#[utoipa::path(
    get,
    path = "/api/Recibo/{id}",
    params(("id" = i32, Path, description = "Receipt ID")),
    responses(
        (status = 200, description = "Receipt returned", body = ApiResponse<receipt::Model>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "receipts"
)]
pub async fn get_receipt(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<receipt::Model> {
    Ok(ok(state.services.receipts.get_receipt(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/Recibo/{id}",
    params(("id" = i32, Path, description = "Receipt ID")),
    request_body = UpdateReceiptInput,
    responses(
        (status = 200, description = "Receipt updated", body = ApiResponse<receipt::Model>),
        (status = 400, description = "Invalid request or batched receipt", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "receipts"
)]
pub async fn update_receipt(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateReceiptInput>,
) -> ApiResult<receipt::Model> {
    Ok(ok(state.services.receipts.update_receipt(id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/Recibo/{id}",
    params(("id" = i32, Path, description = "Receipt ID")),
    responses(
        (status = 200, description = "Receipt deleted"),
        (status = 400, description = "Receipt belongs to a batch", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "receipts"
)]
pub async fn delete_receipt(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<i32> {
    state.services.receipts.delete_receipt(id).await?;
    Ok(ok_with_message(id, "Receipt deleted"))
}

pub fn receipt_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_receipts).post(create_receipt))
        .route(
            "/:id",
            get(get_receipt).put(update_receipt).delete(delete_receipt),
        )
}
