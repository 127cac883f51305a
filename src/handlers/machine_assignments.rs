use axum::{
    extract::{Path, State},
    routing::{delete, get, post, put},
    Router,
};

use super::common::{ok, ok_with_message, ValidatedJson};
use crate::{
    entities::{machine, machine_client},
    handlers::AppState,
    services::machine_assignments::{AssignMachineInput, CurrentClient, ReassignMachineInput},
    ApiResponse, ApiResult,
};

/// Link a machine to a client
#[utoipa::path(
    post,
    path = "/api/Maquina-Cliente/asignar",
    request_body = AssignMachineInput,
    responses(
        (status = 200, description = "Machine assigned", body = ApiResponse<machine_client::Model>),
        (status = 400, description = "Machine held by another client or user is not a client", body = crate::errors::ErrorResponse),
        (status = 404, description = "Machine or client not found", body = crate::errors::ErrorResponse)
    ),
    tag = "machine-assignments"
)]
pub async fn assign_machine(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<AssignMachineInput>,
) -> ApiResult<machine_client::Model> {
    let link = state
        .services
        .assignments
        .assign(payload.client_id, payload.machine_id)
        .await?;
    Ok(ok_with_message(link, "Machine assigned"))
}

/// Move a machine to another client
#[utoipa::path(
    put,
    path = "/api/Maquina-Cliente/reasignar",
    request_body = ReassignMachineInput,
    responses(
        (status = 200, description = "Machine reassigned", body = ApiResponse<machine_client::Model>),
        (status = 400, description = "Current holder does not match", body = crate::errors::ErrorResponse),
        (status = 404, description = "Machine or client not found", body = crate::errors::ErrorResponse)
    ),
    tag = "machine-assignments"
)]
pub async fn reassign_machine(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ReassignMachineInput>,
) -> ApiResult<machine_client::Model> {
    let link = state.services.assignments.reassign(payload).await?;
    Ok(ok_with_message(link, "Machine reassigned"))
}

#[utoipa::path(
    delete,
    path = "/api/Maquina-Cliente/desasignar/{machine_id}",
    params(("machine_id" = i32, Path, description = "Machine ID")),
    responses(
        (status = 200, description = "Machine unassigned"),
        (status = 404, description = "Machine has no client", body = crate::errors::ErrorResponse)
    ),
    tag = "machine-assignments"
)]
pub async fn unassign_machine(
    State(state): State<AppState>,
    Path(machine_id): Path<i32>,
) -> ApiResult<i32> {
    state.services.assignments.unassign(machine_id).await?;
    Ok(ok_with_message(machine_id, "Machine unassigned"))
}

#[utoipa::path(
    get,
    path = "/api/Maquina-Cliente/cliente-actual/{machine_id}",
    params(("machine_id" = i32, Path, description = "Machine ID")),
    responses(
        (status = 200, description = "Current client", body = ApiResponse<CurrentClient>),
        (status = 404, description = "Machine has no client", body = crate::errors::ErrorResponse)
    ),
    tag = "machine-assignments"
)]
pub async fn current_client(
    State(state): State<AppState>,
    Path(machine_id): Path<i32>,
) -> ApiResult<CurrentClient> {
    Ok(ok(state.services.assignments.current_client(machine_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/Maquina-Cliente/cliente/{client_id}/maquinas",
    params(("client_id" = i32, Path, description = "Client user ID")),
    responses(
        (status = 200, description = "Machines held by the client", body = ApiResponse<Vec<machine::Model>>),
        (status = 404, description = "Client not found", body = crate::errors::ErrorResponse)
    ),
    tag = "machine-assignments"
)]
pub async fn machines_by_client(
    State(state): State<AppState>,
    Path(client_id): Path<i32>,
) -> ApiResult<Vec<machine::Model>> {
    Ok(ok(state
        .services
        .assignments
        .machines_by_client(client_id)
        .await?))
}

pub fn assignment_routes() -> Router<AppState> {
    Router::new()
        .route("/asignar", post(assign_machine))
        .route("/reasignar", put(reassign_machine))
        .route("/desasignar/:machine_id", delete(unassign_machine))
        .route("/cliente-actual/:machine_id", get(current_client))
        .route("/cliente/:client_id/maquinas", get(machines_by_client))
}
