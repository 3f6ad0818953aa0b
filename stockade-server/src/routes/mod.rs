//! HTTP routes for the shop server

mod auth;
mod companies;
mod inventory;
mod orders;
mod users;

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;

use crate::dispatch::CodeDispatcher;
use crate::state::AppState;
use crate::store::Repository;

/// Create the router with all routes
///
/// The two login endpoints are expected to sit behind a rate-limiting
/// boundary; the service itself does not count attempts.
pub fn create_router<R, D>(state: Arc<AppState<R, D>>) -> Router
where
    R: Repository + 'static,
    D: CodeDispatcher + 'static,
{
    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/verify-otp", post(auth::verify_otp))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/users", post(users::create_user))
        .route("/api/inventory", post(inventory::add_item))
        .route("/api/inventory/:id/quantity", put(inventory::update_quantity))
        .route("/api/orders", post(orders::create_order).get(orders::get_orders))
        .route("/api/orders/:id/status", put(orders::update_status))
        .route("/api/companies", get(companies::get_companies).post(companies::create_company))
        .with_state(state)
}
