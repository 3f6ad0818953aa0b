//! Storage abstractions for the shop
//!
//! The relational store is reached through the `Repository` trait. Order
//! placement is the one multi-row mutation that needs atomicity beyond a
//! single key, so the trait hands out an explicit transaction handle:
//! inventory decrements and order/line creation inside one handle become
//! visible together or not at all.

pub mod models;
pub mod sqlite;

pub use models::*;
pub use sqlite::SqliteRepository;

use chrono::{DateTime, Utc};
use stockade_core::{AccountStatus, OrderStatus};

use crate::error::ServerError;

/// Result type for store operations
pub type StoreResult<T> = Result<T, ServerError>;

/// Trait for user, company, inventory, and order storage
pub trait Repository: Send + Sync {
    /// Get a user by ID
    fn find_user(&self, id: UserId) -> StoreResult<Option<User>>;

    /// Get a user by email address
    fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Create a new user
    fn create_user(&self, new: NewUser) -> StoreResult<User>;

    /// Set a user's account status; false when the user is absent
    fn set_account_status(&self, id: UserId, status: AccountStatus) -> StoreResult<bool>;

    /// Create a new company
    fn create_company(&self, name: &str, description: Option<&str>) -> StoreResult<Company>;

    /// List all companies
    fn list_companies(&self) -> StoreResult<Vec<Company>>;

    /// Add a new inventory line
    fn create_inventory_line(&self, new: NewInventoryLine) -> StoreResult<InventoryLine>;

    /// Get an inventory line by ID, scoped to a company
    fn find_inventory_line(
        &self,
        item_id: &ItemId,
        company_id: &CompanyId,
    ) -> StoreResult<Option<InventoryLine>>;

    /// Replace an inventory line's quantity; None if the line is absent
    fn set_inventory_quantity(
        &self,
        item_id: &ItemId,
        company_id: &CompanyId,
        quantity: i64,
    ) -> StoreResult<Option<InventoryLine>>;

    /// Get an order (with its lines) by ID
    fn find_order(&self, id: &OrderId) -> StoreResult<Option<Order>>;

    /// List a company's orders, optionally restricted to one user
    fn list_orders(&self, company_id: &CompanyId, user_id: Option<UserId>)
        -> StoreResult<Vec<Order>>;

    /// Begin a transaction; dropping the handle without committing rolls
    /// every change back
    fn begin(&self) -> StoreResult<Box<dyn StoreTx + '_>>;
}

/// A live store transaction
pub trait StoreTx {
    /// Get an inventory line by ID, scoped to a company
    fn find_inventory_line(
        &self,
        item_id: &ItemId,
        company_id: &CompanyId,
    ) -> StoreResult<Option<InventoryLine>>;

    /// Decrement an inventory line's quantity, guarded so it cannot go
    /// negative; false when the remaining quantity was insufficient
    fn decrement_inventory(
        &self,
        item_id: &ItemId,
        company_id: &CompanyId,
        by: i64,
    ) -> StoreResult<bool>;

    /// Insert an order header
    fn insert_order(&self, order: &Order) -> StoreResult<()>;

    /// Insert one order line
    fn insert_order_line(&self, order_id: &OrderId, line: &OrderLine) -> StoreResult<()>;

    /// Get an order (with its lines) by ID
    fn find_order(&self, id: &OrderId) -> StoreResult<Option<Order>>;

    /// Set an order's status and updated_at; false when the order is absent
    fn update_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<bool>;

    /// Commit the transaction
    fn commit(self: Box<Self>) -> StoreResult<()>;
}
