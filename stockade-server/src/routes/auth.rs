//! Authentication endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use stockade_core::Role;

use crate::auth::LoginChallenge;
use crate::dispatch::CodeDispatcher;
use crate::error::ServerError;
use crate::state::AppState;
use crate::store::Repository;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/auth/login
///
/// Step one: verify credentials; a one-time code is dispatched on success.
pub async fn login<R, D>(
    State(state): State<Arc<AppState<R, D>>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginChallenge>, ServerError>
where
    R: Repository,
    D: CodeDispatcher,
{
    if req.email.is_empty() || req.password.is_empty() {
        return Err(ServerError::validation("email and password are required"));
    }

    let challenge = state.auth.authenticate(&req.email, &req.password).await?;
    Ok(Json(challenge))
}

#[derive(Deserialize)]
pub struct VerifyOtpRequest {
    pub user_id: i64,
    pub otp: String,
}

#[derive(Serialize)]
pub struct VerifyOtpResponse {
    pub token: String,
}

/// POST /api/auth/verify-otp
///
/// Step two: consume the one-time code and receive a session token.
pub async fn verify_otp<R, D>(
    State(state): State<Arc<AppState<R, D>>>,
    Json(req): Json<VerifyOtpRequest>,
) -> Result<Json<VerifyOtpResponse>, ServerError>
where
    R: Repository,
    D: CodeDispatcher,
{
    let token = state.auth.complete(req.user_id, &req.otp).await?;
    Ok(Json(VerifyOtpResponse { token }))
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub message: String,
}

/// POST /api/auth/logout
pub async fn logout<R, D>(
    State(state): State<Arc<AppState<R, D>>>,
    headers: HeaderMap,
) -> Result<Json<LogoutResponse>, ServerError>
where
    R: Repository,
    D: CodeDispatcher,
{
    let ctx = state
        .gate
        .authorize(&headers, &[Role::Admin, Role::Clerk, Role::Customer])
        .await?;

    state.auth.logout(ctx.user_id).await?;
    Ok(Json(LogoutResponse {
        message: "Logged out successfully".to_string(),
    }))
}
