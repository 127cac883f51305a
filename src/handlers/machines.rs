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
    entities::machine::{self, MachineStatus},
    errors::ServiceError,
    handlers::AppState,
    services::machines::{CreateMachineInput, UpdateMachineInput},
    ApiResponse, ApiResult,
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MachineQuery {
    pub status: Option<MachineStatus>,
}

#[utoipa::path(
    get,
    path = "/api/Maquina",
    params(MachineQuery),
    responses(
        (status = 200, description = "Machines listed", body = ApiResponse<Vec<machine::Model>>)
    ),
    tag = "machines"
)]
pub async fn list_machines(
    State(state): State<AppState>,
    Query(query): Query<MachineQuery>,
) -> ApiResult<Vec<machine::Model>> {
    Ok(ok(state.services.machines.list_machines(query.status).await?))
}

#[utoipa::path(
    post,
    path = "/api/Maquina",
    request_body = CreateMachineInput,
    responses(
        (status = 201, description = "Machine created", body = ApiResponse<machine::Model>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "machines"
)]
pub async fn create_machine(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateMachineInput>,
) -> Result<(StatusCode, Json<ApiResponse<machine::Model>>), ServiceError> {
    Ok(created(state.services.machines.create_machine(payload).await?))
}

#[utoipa::path(
    get,
    path = "/api/Maquina/{id}",
    params(("id" = i32, Path, description = "Machine ID")),
    responses(
        (status = 200, description = "Machine returned", body = ApiResponse<machine::Model>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "machines"
)]
pub async fn get_machine(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<machine::Model> {
    Ok(ok(state.services.machines.get_machine(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/Maquina/{id}",
    params(("id" = i32, Path, description = "Machine ID")),
    request_body = UpdateMachineInput,
    responses(
        (status = 200, description = "Machine updated", body = ApiResponse<machine::Model>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "machines"
)]
pub async fn update_machine(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateMachineInput>,
) -> ApiResult<machine::Model> {
    Ok(ok(state.services.machines.update_machine(id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/Maquina/{id}",
    params(("id" = i32, Path, description = "Machine ID")),
    responses(
        (status = 200, description = "Machine deleted"),
        (status = 400, description = "Machine is assigned or referenced", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "machines"
)]
pub async fn delete_machine(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<i32> {
    state.services.machines.delete_machine(id).await?;
    Ok(ok_with_message(id, "Machine deleted"))
}

pub fn machine_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_machines).post(create_machine))
        .route(
            "/:id",
            get(get_machine).put(update_machine).delete(delete_machine),
        )
}
