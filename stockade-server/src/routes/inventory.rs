//! Inventory management endpoints

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use stockade_core::Role;

use crate::dispatch::CodeDispatcher;
use crate::error::ServerError;
use crate::state::AppState;
use crate::store::{CompanyId, ItemId, NewInventoryLine, Repository};

#[derive(Deserialize)]
pub struct AddItemRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: String,
    pub quantity: i64,
    pub price: f64,
}

#[derive(Serialize)]
pub struct AddItemResponse {
    pub message: String,
    pub item_id: String,
}

/// POST /api/inventory (admin, clerk)
///
/// The new line is always owned by the caller's company.
pub async fn add_item<R, D>(
    State(state): State<Arc<AppState<R, D>>>,
    headers: HeaderMap,
    Json(req): Json<AddItemRequest>,
) -> Result<Json<AddItemResponse>, ServerError>
where
    R: Repository,
    D: CodeDispatcher,
{
    let ctx = state
        .gate
        .authorize(&headers, &[Role::Admin, Role::Clerk])
        .await?;

    let line = state.engine.add_inventory_line(NewInventoryLine {
        name: req.name,
        description: req.description,
        category: req.category,
        quantity: req.quantity,
        price: req.price,
        company_id: CompanyId(ctx.company_id),
    })?;

    Ok(Json(AddItemResponse {
        message: "Item added successfully".to_string(),
        item_id: line.id.0,
    }))
}

#[derive(Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}

#[derive(Serialize)]
pub struct UpdateQuantityResponse {
    pub message: String,
    pub item_id: String,
    pub quantity: i64,
}

/// PUT /api/inventory/:id/quantity (admin, clerk)
pub async fn update_quantity<R, D>(
    State(state): State<Arc<AppState<R, D>>>,
    headers: HeaderMap,
    Path(item_id): Path<String>,
    Json(req): Json<UpdateQuantityRequest>,
) -> Result<Json<UpdateQuantityResponse>, ServerError>
where
    R: Repository,
    D: CodeDispatcher,
{
    let ctx = state
        .gate
        .authorize(&headers, &[Role::Admin, Role::Clerk])
        .await?;

    let line = state.engine.update_quantity(
        &ItemId(item_id),
        &CompanyId(ctx.company_id),
        req.quantity,
    )?;

    Ok(Json(UpdateQuantityResponse {
        message: "Quantity updated successfully".to_string(),
        item_id: line.id.0,
        quantity: line.quantity,
    }))
}
