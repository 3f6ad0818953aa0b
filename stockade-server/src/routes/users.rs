//! User management endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use stockade_core::Role;

use crate::dispatch::CodeDispatcher;
use crate::error::ServerError;
use crate::state::AppState;
use crate::store::Repository;
use crate::users::CreateUser;

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub forename: String,
    pub surname: String,
    pub role: Role,
    pub company_id: String,
}

#[derive(Serialize)]
pub struct CreateUserResponse {
    pub message: String,
    pub user_id: i64,
}

/// POST /api/users (admin only)
pub async fn create_user<R, D>(
    State(state): State<Arc<AppState<R, D>>>,
    headers: HeaderMap,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<CreateUserResponse>, ServerError>
where
    R: Repository,
    D: CodeDispatcher,
{
    state.gate.authorize(&headers, &[Role::Admin]).await?;

    let user = state.users.create_user(CreateUser {
        email: req.email,
        password: req.password,
        forename: req.forename,
        surname: req.surname,
        role: req.role,
        company_id: req.company_id,
    })?;

    Ok(Json(CreateUserResponse {
        message: "User created successfully".to_string(),
        user_id: user.id.0,
    }))
}
