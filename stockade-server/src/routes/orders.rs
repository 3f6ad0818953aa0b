//! Order endpoints

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use stockade_core::{OrderStatus, Role};

use crate::dispatch::CodeDispatcher;
use crate::engine::OrderRequestLine;
use crate::error::ServerError;
use crate::state::AppState;
use crate::store::{CompanyId, ItemId, Order, OrderId, Repository, UserId};

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItemRequest>,
}

#[derive(Deserialize)]
pub struct OrderItemRequest {
    pub item_id: String,
    pub quantity: i64,
}

#[derive(Serialize)]
pub struct CreateOrderResponse {
    pub message: String,
    pub order_id: String,
}

/// POST /api/orders (customer only)
///
/// Reserves stock for every line atomically; a single failing line aborts
/// the whole order.
pub async fn create_order<R, D>(
    State(state): State<Arc<AppState<R, D>>>,
    headers: HeaderMap,
    Json(req): Json<CreateOrderRequest>,
) -> Result<Json<CreateOrderResponse>, ServerError>
where
    R: Repository,
    D: CodeDispatcher,
{
    let ctx = state.gate.authorize(&headers, &[Role::Customer]).await?;

    let requested: Vec<OrderRequestLine> = req
        .items
        .into_iter()
        .map(|item| OrderRequestLine {
            item_id: ItemId(item.item_id),
            quantity: item.quantity,
        })
        .collect();

    let order = state.engine.place_order(
        UserId(ctx.user_id),
        &CompanyId(ctx.company_id),
        &requested,
    )?;

    Ok(Json(CreateOrderResponse {
        message: "Order created successfully".to_string(),
        order_id: order.id.0,
    }))
}

#[derive(Serialize)]
pub struct OrderInfo {
    pub id: String,
    pub status: OrderStatus,
    pub created_at: String,
    pub items: Vec<OrderLineInfo>,
}

#[derive(Serialize)]
pub struct OrderLineInfo {
    pub item_id: String,
    pub quantity: i64,
    pub price: f64,
}

impl From<Order> for OrderInfo {
    fn from(order: Order) -> Self {
        OrderInfo {
            id: order.id.0,
            status: order.status,
            created_at: order.created_at.to_rfc3339(),
            items: order
                .lines
                .into_iter()
                .map(|line| OrderLineInfo {
                    item_id: line.item_id.0,
                    quantity: line.quantity,
                    price: line.price_at_time,
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
pub struct ListOrdersResponse {
    pub orders: Vec<OrderInfo>,
}

/// GET /api/orders
///
/// Company-scoped; customers only see their own orders.
pub async fn get_orders<R, D>(
    State(state): State<Arc<AppState<R, D>>>,
    headers: HeaderMap,
) -> Result<Json<ListOrdersResponse>, ServerError>
where
    R: Repository,
    D: CodeDispatcher,
{
    let ctx = state
        .gate
        .authorize(&headers, &[Role::Admin, Role::Clerk, Role::Customer])
        .await?;

    let user_filter = match ctx.role {
        Role::Customer => Some(UserId(ctx.user_id)),
        Role::Admin | Role::Clerk => None,
    };

    let orders = state
        .repo
        .list_orders(&CompanyId(ctx.company_id), user_filter)?;

    Ok(Json(ListOrdersResponse {
        orders: orders.into_iter().map(OrderInfo::from).collect(),
    }))
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

#[derive(Serialize)]
pub struct UpdateStatusResponse {
    pub message: String,
    pub order_id: String,
    pub status: OrderStatus,
}

/// PUT /api/orders/:id/status (admin, clerk)
pub async fn update_status<R, D>(
    State(state): State<Arc<AppState<R, D>>>,
    headers: HeaderMap,
    Path(order_id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<UpdateStatusResponse>, ServerError>
where
    R: Repository,
    D: CodeDispatcher,
{
    state
        .gate
        .authorize(&headers, &[Role::Admin, Role::Clerk])
        .await?;

    let order = state
        .engine
        .update_status(&OrderId(order_id), req.status)?;

    Ok(Json(UpdateStatusResponse {
        message: "Order status updated".to_string(),
        order_id: order.id.0,
        status: order.status,
    }))
}
