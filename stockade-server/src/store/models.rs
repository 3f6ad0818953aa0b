//! Data models for the shop store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stockade_core::{AccountStatus, OrderStatus, Role};
use uuid::Uuid;

/// Unique user identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

/// Unique company identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompanyId(pub String);

impl CompanyId {
    /// Generate a fresh company id in the `company_xxxxxxxx` form
    pub fn generate() -> Self {
        let uuid = Uuid::new_v4().to_string();
        CompanyId(format!("company_{}", &uuid[..8]))
    }
}

impl std::fmt::Display for CompanyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique inventory item identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn generate() -> Self {
        ItemId(Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique order identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub String);

impl OrderId {
    pub fn generate() -> Self {
        OrderId(Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A user account
///
/// Read-only to the authentication subsystem; provisioning and status
/// edits go through the user directory.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub forename: String,
    pub surname: String,
    pub role: Role,
    pub status: AccountStatus,
    pub company_id: CompanyId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for provisioning a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub forename: String,
    pub surname: String,
    pub role: Role,
    pub company_id: CompanyId,
}

/// A company (tenant)
#[derive(Debug, Clone)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line of stock owned by a company
#[derive(Debug, Clone)]
pub struct InventoryLine {
    pub id: ItemId,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub quantity: i64,
    pub price: f64,
    pub company_id: CompanyId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for adding a new inventory line
#[derive(Debug, Clone)]
pub struct NewInventoryLine {
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub quantity: i64,
    pub price: f64,
    pub company_id: CompanyId,
}

/// An order with its lines
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub company_id: CompanyId,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub lines: Vec<OrderLine>,
}

/// A line within an order
///
/// `price_at_time` snapshots the inventory price at placement and is
/// never recomputed.
#[derive(Debug, Clone)]
pub struct OrderLine {
    pub item_id: ItemId,
    pub quantity: i64,
    pub price_at_time: f64,
}
