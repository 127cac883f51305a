use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use utoipa::IntoParams;

use super::common::{created, ok, ok_with_message, ValidatedJson};
use crate::{
    entities::receipt_batch,
    errors::ServiceError,
    handlers::AppState,
    services::receipt_batches::{CreateReceiptBatchInput, ReceiptBatchDetail},
    ApiResponse, ApiResult,
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BatchQuery {
    pub client_id: Option<i32>,
}

#[utoipa::path(
    get,
    path = "/api/Lote-Recibo",
    params(BatchQuery),
    responses((status = 200, description = "Batches listed", body = ApiResponse<Vec<receipt_batch::Model>>)),
    tag = "receipt-batches"
)]
pub async fn list_batches(
    State(state): State<AppState>,
    Query(query): Query<BatchQuery>,
) -> ApiResult<Vec<receipt_batch::Model>> {
    Ok(ok(state
        .services
        .receipt_batches
        .list_batches(query.client_id)
        .await?))
}

/// Create a batch from new receipt lines and the client's open receipts in the period
#[utoipa::path(
    post,
    path = "/api/Lote-Recibo",
    request_body = CreateReceiptBatchInput,
    responses(
        (status = 201, description = "Batch created", body = ApiResponse<ReceiptBatchDetail>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Client or machine not found", body = crate::errors::ErrorResponse)
    ),
    tag = "receipt-batches"
)]
pub async fn create_batch(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateReceiptBatchInput>,
) -> Result<(StatusCode, Json<ApiResponse<ReceiptBatchDetail>>), ServiceError> {
    Ok(created(
        state.services.receipt_batches.create_batch(payload).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/Lote-Recibo/{id}",
    params(("id" = i32, Path, description = "Batch ID")),
    responses(
        (status = 200, description = "Batch with its receipts", body = ApiResponse<ReceiptBatchDetail>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "receipt-batches"
)]
pub async fn get_batch(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<ReceiptBatchDetail> {
    Ok(ok(state.services.receipt_batches.get_batch(id).await?))
}

/// Delete a batch and its receipts
#[utoipa::path(
    delete,
    path = "/api/Lote-Recibo/{id}",
    params(("id" = i32, Path, description = "Batch ID")),
    responses(
        (status = 200, description = "Batch deleted; data is the number of receipts removed"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "receipt-batches"
)]
pub async fn delete_batch(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<u64> {
    let removed = state.services.receipt_batches.delete_batch(id).await?;
    Ok(ok_with_message(removed, "Receipt batch deleted"))
}

pub fn receipt_batch_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_batches).post(create_batch))
        .route("/:id", get(get_batch).delete(delete_batch))
}
