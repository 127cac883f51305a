use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};

use super::common::{created, ok, ok_with_message, ValidatedJson};
use crate::{
    entities::{part_used, repair_request},
    errors::ServiceError,
    handlers::AppState,
    services::repair_requests::{
        AddPartUsedInput, AssignTechnicianInput, CreateRepairRequestInput, RepairDoneInput,
        RepairOutcome, RepairRequestFilter, UpdateRepairRequestInput,
    },
    ApiResponse, ApiResult,
};

/// List repair requests, newest first
#[utoipa::path(
    get,
    path = "/api/SolicitudReparacion",
    params(RepairRequestFilter),
    responses((status = 200, description = "Repair requests listed", body = ApiResponse<Vec<repair_request::Model>>)),
    tag = "repair-requests"
)]
pub async fn list_requests(
    State(state): State<AppState>,
    Query(filter): Query<RepairRequestFilter>,
) -> ApiResult<Vec<repair_request::Model>> {
    Ok(ok(state.services.repair_requests.list_requests(filter).await?))
}

/// Open a PENDING repair request
#[utoipa::path(
    post,
    path = "/api/SolicitudReparacion",
    request_body = CreateRepairRequestInput,
    responses(
        (status = 201, description = "Repair request created", body = ApiResponse<RepairOutcome>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Client or machine not found", body = crate::errors::ErrorResponse)
    ),
    tag = "repair-requests"
)]
pub async fn create_request(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateRepairRequestInput>,
) -> Result<(StatusCode, Json<ApiResponse<RepairOutcome>>), ServiceError> {
    Ok(created(
        state.services.repair_requests.create_request(payload).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/SolicitudReparacion/{id}",
    params(("id" = i32, Path, description = "Repair request ID")),
    responses(
        (status = 200, description = "Repair request returned", body = ApiResponse<repair_request::Model>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "repair-requests"
)]
pub async fn get_request(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<repair_request::Model> {
    Ok(ok(state.services.repair_requests.get_request(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/SolicitudReparacion/{id}",
    params(("id" = i32, Path, description = "Repair request ID")),
    request_body = UpdateRepairRequestInput,
    responses(
        (status = 200, description = "Repair request updated", body = ApiResponse<repair_request::Model>),
        (status = 400, description = "Request is no longer PENDING", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "repair-requests"
)]
pub async fn update_request(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateRepairRequestInput>,
) -> ApiResult<repair_request::Model> {
    Ok(ok(state
        .services
        .repair_requests
        .update_request(id, payload)
        .await?))
}

#[utoipa::path(
    delete,
    path = "/api/SolicitudReparacion/{id}",
    params(("id" = i32, Path, description = "Repair request ID")),
    responses(
        (status = 200, description = "Repair request deleted"),
        (status = 400, description = "Request is no longer PENDING or has parts", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "repair-requests"
)]
pub async fn delete_request(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<i32> {
    state.services.repair_requests.delete_request(id).await?;
    Ok(ok_with_message(id, "Repair request deleted"))
}

/// Assign or reschedule a technician
#[utoipa::path(
    put,
    path = "/api/SolicitudReparacion/{id}/assign",
    params(("id" = i32, Path, description = "Repair request ID")),
    request_body = AssignTechnicianInput,
    responses(
        (status = 200, description = "Technician assigned", body = ApiResponse<RepairOutcome>),
        (status = 400, description = "Invalid state or user is not a technician", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "repair-requests"
)]
pub async fn assign_technician(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<AssignTechnicianInput>,
) -> ApiResult<RepairOutcome> {
    let outcome = state
        .services
        .repair_requests
        .assign_technician(id, payload)
        .await?;
    Ok(ok_with_message(outcome, "Technician assigned"))
}

/// Technician reports the repair as done; the client must verify it
#[utoipa::path(
    put,
    path = "/api/SolicitudReparacion/{id}/repair-done",
    params(("id" = i32, Path, description = "Repair request ID")),
    request_body = RepairDoneInput,
    responses(
        (status = 200, description = "Repair marked as done", body = ApiResponse<RepairOutcome>),
        (status = 400, description = "Invalid state", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "repair-requests"
)]
pub async fn mark_repair_done(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<RepairDoneInput>,
) -> ApiResult<RepairOutcome> {
    let outcome = state
        .services
        .repair_requests
        .mark_repair_done(id, payload)
        .await?;
    Ok(ok_with_message(outcome, "Repair marked as done"))
}

/// Client confirms the repair
#[utoipa::path(
    put,
    path = "/api/SolicitudReparacion/{id}/finalize",
    params(("id" = i32, Path, description = "Repair request ID")),
    responses(
        (status = 200, description = "Repair finalized", body = ApiResponse<RepairOutcome>),
        (status = 400, description = "Invalid state", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "repair-requests"
)]
pub async fn finalize(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<RepairOutcome> {
    let outcome = state.services.repair_requests.finalize(id).await?;
    Ok(ok_with_message(outcome, "Repair finalized"))
}

/// Record a part consumed by the repair and take it out of stock
#[utoipa::path(
    post,
    path = "/api/SolicitudReparacion/{id}/parts",
    params(("id" = i32, Path, description = "Repair request ID")),
    request_body = AddPartUsedInput,
    responses(
        (status = 201, description = "Part recorded", body = ApiResponse<part_used::Model>),
        (status = 400, description = "Insufficient stock or request finalized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Request or part not found", body = crate::errors::ErrorResponse)
    ),
    tag = "repair-requests"
)]
pub async fn add_part_used(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<AddPartUsedInput>,
) -> Result<(StatusCode, Json<ApiResponse<part_used::Model>>), ServiceError> {
    Ok(created(
        state
            .services
            .repair_requests
            .add_part_used(id, payload)
            .await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/SolicitudReparacion/{id}/parts",
    params(("id" = i32, Path, description = "Repair request ID")),
    responses(
        (status = 200, description = "Parts used", body = ApiResponse<Vec<part_used::Model>>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "repair-requests"
)]
pub async fn parts_used(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Vec<part_used::Model>> {
    Ok(ok(state.services.repair_requests.parts_used(id).await?))
}

pub fn repair_request_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_requests).post(create_request))
        .route(
            "/:id",
            get(get_request).put(update_request).delete(delete_request),
        )
        .route("/:id/assign", put(assign_technician))
        .route("/:id/repair-done", put(mark_repair_done))
        .route("/:id/finalize", put(finalize))
        .route("/:id/parts", get(parts_used).post(add_part_used))
}
