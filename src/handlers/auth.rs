use axum::{extract::State, http::StatusCode, routing::post, Json, Router};

use super::common::{created, ok, ok_with_message, ValidatedJson};
use crate::{
    entities::user,
    errors::ServiceError,
    handlers::AppState,
    services::auth::{LoginChallenge, LoginInput, RegisterInput, ResendCodeInput, VerifyCodeInput},
    ApiResponse, ApiResult,
};

/// First login step: checks the password and emails a one-time code
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginInput,
    responses(
        (status = 200, description = "Code sent", body = ApiResponse<LoginChallenge>),
        (status = 401, description = "Invalid credentials", body = crate::errors::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginInput>,
) -> ApiResult<LoginChallenge> {
    let challenge = state.services.auth.login(payload).await?;
    Ok(ok_with_message(challenge, "Verification code sent"))
}

/// Second login step: exchanges the emailed code for the user profile
#[utoipa::path(
    post,
    path = "/api/auth/verify-code",
    request_body = VerifyCodeInput,
    responses(
        (status = 200, description = "Login complete", body = ApiResponse<user::Model>),
        (status = 401, description = "Invalid or expired code", body = crate::errors::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn verify_code(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<VerifyCodeInput>,
) -> ApiResult<user::Model> {
    Ok(ok(state.services.auth.verify_code(payload).await?))
}

#[utoipa::path(
    post,
    path = "/api/auth/resend-code",
    request_body = ResendCodeInput,
    responses(
        (status = 200, description = "Code sent again", body = ApiResponse<LoginChallenge>),
        (status = 401, description = "No pending login", body = crate::errors::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn resend_code(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ResendCodeInput>,
) -> ApiResult<LoginChallenge> {
    let challenge = state.services.auth.resend_code(payload).await?;
    Ok(ok_with_message(challenge, "Verification code sent"))
}

/// Self-service registration; new accounts are clients
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterInput,
    responses(
        (status = 201, description = "Account created", body = ApiResponse<user::Model>),
        (status = 400, description = "Invalid request or username taken", body = crate::errors::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterInput>,
) -> Result<(StatusCode, Json<ApiResponse<user::Model>>), ServiceError> {
    Ok(created(state.services.auth.register(payload).await?))
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/verify-code", post(verify_code))
        .route("/resend-code", post(resend_code))
        .route("/register", post(register))
}
