//! Company management endpoints

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

#[derive(Serialize)]
pub struct CompanyInfo {
    pub id: String,
    pub name: String,
}

#[derive(Serialize)]
pub struct ListCompaniesResponse {
    pub companies: Vec<CompanyInfo>,
}

/// GET /api/companies (admin only)
pub async fn get_companies<R, D>(
    State(state): State<Arc<AppState<R, D>>>,
    headers: HeaderMap,
) -> Result<Json<ListCompaniesResponse>, ServerError>
where
    R: Repository,
    D: CodeDispatcher,
{
    state.gate.authorize(&headers, &[Role::Admin]).await?;

    let companies = state.repo.list_companies()?;
    Ok(Json(ListCompaniesResponse {
        companies: companies
            .into_iter()
            .map(|c| CompanyInfo {
                id: c.id.0,
                name: c.name,
            })
            .collect(),
    }))
}

#[derive(Deserialize)]
pub struct CreateCompanyRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Serialize)]
pub struct CreateCompanyResponse {
    pub message: String,
    pub company_id: String,
}

/// POST /api/companies (admin only)
pub async fn create_company<R, D>(
    State(state): State<Arc<AppState<R, D>>>,
    headers: HeaderMap,
    Json(req): Json<CreateCompanyRequest>,
) -> Result<Json<CreateCompanyResponse>, ServerError>
where
    R: Repository,
    D: CodeDispatcher,
{
    state.gate.authorize(&headers, &[Role::Admin]).await?;

    if req.name.trim().is_empty() {
        return Err(ServerError::validation("company name cannot be empty"));
    }
    if req.name.len() > 255 {
        return Err(ServerError::validation(
            "company name must be less than 255 characters",
        ));
    }

    let company = state
        .repo
        .create_company(req.name.trim(), req.description.as_deref())?;

    tracing::info!(company_id = %company.id, "Company created");

    Ok(Json(CreateCompanyResponse {
        message: "Company created successfully".to_string(),
        company_id: company.id.0,
    }))
}
