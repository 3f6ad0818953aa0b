//! SQLite-based repository implementation

use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use stockade_core::{AccountStatus, OrderStatus, Role};

use super::{
    Company, CompanyId, InventoryLine, ItemId, NewInventoryLine, NewUser, Order, OrderId,
    OrderLine, Repository, StoreResult, StoreTx, User, UserId,
};
use crate::error::ServerError;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Company id used for seed data
pub const DEFAULT_COMPANY_ID: &str = "default_company";

/// SQLite-backed repository
///
/// A single connection behind a mutex: transactions hold the lock for
/// their whole lifetime, so multi-row mutations are serialized and either
/// commit completely or roll back completely.
pub struct SqliteRepository {
    conn: Mutex<Connection>,
}

impl SqliteRepository {
    /// Open or create a SQLite database at the given path
    pub fn open(path: &str) -> Result<Self, ServerError> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open an in-memory database (tests, ephemeral deployments)
    pub fn open_in_memory() -> Result<Self, ServerError> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, ServerError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Self::migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run database migrations
    fn migrate(conn: &Connection) -> Result<(), ServerError> {
        let current_version = Self::get_schema_version(conn)?;

        if current_version < SCHEMA_VERSION {
            tracing::info!(
                current = current_version,
                target = SCHEMA_VERSION,
                "Running database migrations"
            );

            if current_version < 1 {
                Self::migrate_v1(conn)?;
            }

            conn.execute(
                "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
                params![SCHEMA_VERSION],
            )?;

            tracing::info!("Database migrations complete");
        }

        Ok(())
    }

    /// Get current schema version (0 if no schema exists)
    fn get_schema_version(conn: &Connection) -> Result<i32, ServerError> {
        let table_exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !table_exists {
            return Ok(0);
        }

        let version = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
            row.get::<_, Option<i32>>(0).map(|v| v.unwrap_or(0))
        })?;
        Ok(version)
    }

    /// Migration to version 1: initial schema
    fn migrate_v1(conn: &Connection) -> Result<(), ServerError> {
        conn.execute_batch(
            r#"
            -- Schema version tracking
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            -- Companies (tenants)
            CREATE TABLE IF NOT EXISTS companies (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                description TEXT,
                status TEXT NOT NULL DEFAULT 'active',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            -- Users
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                forename TEXT NOT NULL,
                surname TEXT NOT NULL,
                role TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'ACTIVE',
                company_id TEXT NOT NULL REFERENCES companies(id),
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            -- Inventory
            CREATE TABLE IF NOT EXISTS inventory_items (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT,
                category TEXT NOT NULL,
                quantity INTEGER NOT NULL CHECK (quantity >= 0),
                price REAL NOT NULL CHECK (price > 0),
                company_id TEXT NOT NULL REFERENCES companies(id),
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_inventory_company ON inventory_items(company_id);

            -- Orders
            CREATE TABLE IF NOT EXISTS orders (
                id TEXT PRIMARY KEY,
                user_id INTEGER NOT NULL REFERENCES users(id),
                company_id TEXT NOT NULL REFERENCES companies(id),
                status TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_orders_company ON orders(company_id);
            CREATE INDEX IF NOT EXISTS idx_orders_user ON orders(user_id);

            -- Order lines
            CREATE TABLE IF NOT EXISTS order_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                order_id TEXT NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
                item_id TEXT NOT NULL REFERENCES inventory_items(id),
                quantity INTEGER NOT NULL CHECK (quantity > 0),
                price_at_time REAL NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_order_items_order ON order_items(order_id);
            "#,
        )?;

        Ok(())
    }

    /// Create the default company if it doesn't exist
    pub fn ensure_default_company(&self) -> StoreResult<Company> {
        let conn = self.conn.lock().unwrap();

        if let Some(company) = find_company(&conn, DEFAULT_COMPANY_ID)? {
            return Ok(company);
        }

        let now = Utc::now();
        conn.execute(
            "INSERT INTO companies (id, name, description, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, 'active', ?4, ?4)",
            params![
                DEFAULT_COMPANY_ID,
                "Default Company",
                Option::<String>::None,
                now.to_rfc3339()
            ],
        )?;
        tracing::info!("Default company created");

        find_company(&conn, DEFAULT_COMPANY_ID)?
            .ok_or_else(|| ServerError::Internal("default company vanished after insert".into()))
    }

    /// Create the default admin user if it doesn't exist
    pub fn ensure_default_admin(&self, email: &str, password_hash: &str) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1)",
            params![email.to_lowercase()],
            |row| row.get(0),
        )?;
        if exists {
            return Ok(());
        }

        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO users (email, password_hash, forename, surname, role, status, company_id, created_at, updated_at)
             VALUES (?1, ?2, 'Admin', 'User', ?3, ?4, ?5, ?6, ?6)",
            params![
                email.to_lowercase(),
                password_hash,
                Role::Admin.as_str(),
                AccountStatus::Active.as_str(),
                DEFAULT_COMPANY_ID,
                now
            ],
        )?;
        tracing::info!(email = %email, "Default admin created");
        Ok(())
    }
}

// Helper: parse a TEXT column into an enum, surfacing corrupt rows as
// conversion failures instead of panicking
fn parse_col<T>(idx: usize, raw: String) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn parse_ts(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: UserId(row.get(0)?),
        email: row.get(1)?,
        password_hash: row.get(2)?,
        forename: row.get(3)?,
        surname: row.get(4)?,
        role: parse_col::<Role>(5, row.get(5)?)?,
        status: parse_col::<AccountStatus>(6, row.get(6)?)?,
        company_id: CompanyId(row.get(7)?),
        created_at: parse_ts(&row.get::<_, String>(8)?),
        updated_at: parse_ts(&row.get::<_, String>(9)?),
    })
}

const USER_COLUMNS: &str =
    "id, email, password_hash, forename, surname, role, status, company_id, created_at, updated_at";

fn row_to_company(row: &rusqlite::Row<'_>) -> rusqlite::Result<Company> {
    Ok(Company {
        id: CompanyId(row.get(0)?),
        name: row.get(1)?,
        description: row.get(2)?,
        status: row.get(3)?,
        created_at: parse_ts(&row.get::<_, String>(4)?),
        updated_at: parse_ts(&row.get::<_, String>(5)?),
    })
}

fn row_to_inventory_line(row: &rusqlite::Row<'_>) -> rusqlite::Result<InventoryLine> {
    Ok(InventoryLine {
        id: ItemId(row.get(0)?),
        name: row.get(1)?,
        description: row.get(2)?,
        category: row.get(3)?,
        quantity: row.get(4)?,
        price: row.get(5)?,
        company_id: CompanyId(row.get(6)?),
        created_at: parse_ts(&row.get::<_, String>(7)?),
        updated_at: parse_ts(&row.get::<_, String>(8)?),
    })
}

const INVENTORY_COLUMNS: &str =
    "id, name, description, category, quantity, price, company_id, created_at, updated_at";

fn find_company(conn: &Connection, id: &str) -> StoreResult<Option<Company>> {
    let company = conn
        .query_row(
            "SELECT id, name, description, status, created_at, updated_at
             FROM companies WHERE id = ?1",
            params![id],
            row_to_company,
        )
        .optional()?;
    Ok(company)
}

fn find_inventory_line(
    conn: &Connection,
    item_id: &ItemId,
    company_id: &CompanyId,
) -> StoreResult<Option<InventoryLine>> {
    let line = conn
        .query_row(
            &format!(
                "SELECT {INVENTORY_COLUMNS} FROM inventory_items WHERE id = ?1 AND company_id = ?2"
            ),
            params![item_id.0, company_id.0],
            row_to_inventory_line,
        )
        .optional()?;
    Ok(line)
}

fn order_lines(conn: &Connection, order_id: &OrderId) -> StoreResult<Vec<OrderLine>> {
    let mut stmt = conn.prepare(
        "SELECT item_id, quantity, price_at_time FROM order_items WHERE order_id = ?1 ORDER BY id",
    )?;
    let lines = stmt
        .query_map(params![order_id.0], |row| {
            Ok(OrderLine {
                item_id: ItemId(row.get(0)?),
                quantity: row.get(1)?,
                price_at_time: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(lines)
}

fn find_order(conn: &Connection, id: &OrderId) -> StoreResult<Option<Order>> {
    let header = conn
        .query_row(
            "SELECT id, user_id, company_id, status, created_at, updated_at
             FROM orders WHERE id = ?1",
            params![id.0],
            |row| {
                Ok(Order {
                    id: OrderId(row.get(0)?),
                    user_id: UserId(row.get(1)?),
                    company_id: CompanyId(row.get(2)?),
                    status: parse_col::<OrderStatus>(3, row.get(3)?)?,
                    created_at: parse_ts(&row.get::<_, String>(4)?),
                    updated_at: parse_ts(&row.get::<_, String>(5)?),
                    lines: Vec::new(),
                })
            },
        )
        .optional()?;

    match header {
        Some(mut order) => {
            order.lines = order_lines(conn, &order.id)?;
            Ok(Some(order))
        }
        None => Ok(None),
    }
}

impl Repository for SqliteRepository {
    fn find_user(&self, id: UserId) -> StoreResult<Option<User>> {
        let conn = self.conn.lock().unwrap();
        let user = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id.0],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let conn = self.conn.lock().unwrap();
        let user = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
                params![email.to_lowercase()],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    fn create_user(&self, new: NewUser) -> StoreResult<User> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO users (email, password_hash, forename, surname, role, status, company_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
            params![
                new.email.to_lowercase(),
                new.password_hash,
                new.forename,
                new.surname,
                new.role.as_str(),
                AccountStatus::Active.as_str(),
                new.company_id.0,
                now.to_rfc3339()
            ],
        )?;

        let id = conn.last_insert_rowid();
        Ok(User {
            id: UserId(id),
            email: new.email.to_lowercase(),
            password_hash: new.password_hash,
            forename: new.forename,
            surname: new.surname,
            role: new.role,
            status: AccountStatus::Active,
            company_id: new.company_id,
            created_at: now,
            updated_at: now,
        })
    }

    fn set_account_status(&self, id: UserId, status: AccountStatus) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            "UPDATE users SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![status.as_str(), Utc::now().to_rfc3339(), id.0],
        )?;
        Ok(updated == 1)
    }

    fn create_company(&self, name: &str, description: Option<&str>) -> StoreResult<Company> {
        let conn = self.conn.lock().unwrap();
        let id = CompanyId::generate();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO companies (id, name, description, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, 'active', ?4, ?4)",
            params![id.0, name, description, now.to_rfc3339()],
        )?;

        Ok(Company {
            id,
            name: name.to_string(),
            description: description.map(|s| s.to_string()),
            status: "active".to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    fn list_companies(&self) -> StoreResult<Vec<Company>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, name, description, status, created_at, updated_at
             FROM companies ORDER BY created_at",
        )?;
        let companies = stmt
            .query_map([], row_to_company)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(companies)
    }

    fn create_inventory_line(&self, new: NewInventoryLine) -> StoreResult<InventoryLine> {
        let conn = self.conn.lock().unwrap();
        let id = ItemId::generate();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO inventory_items (id, name, description, category, quantity, price, company_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
            params![
                id.0,
                new.name,
                new.description,
                new.category,
                new.quantity,
                new.price,
                new.company_id.0,
                now.to_rfc3339()
            ],
        )?;

        Ok(InventoryLine {
            id,
            name: new.name,
            description: new.description,
            category: new.category,
            quantity: new.quantity,
            price: new.price,
            company_id: new.company_id,
            created_at: now,
            updated_at: now,
        })
    }

    fn find_inventory_line(
        &self,
        item_id: &ItemId,
        company_id: &CompanyId,
    ) -> StoreResult<Option<InventoryLine>> {
        let conn = self.conn.lock().unwrap();
        find_inventory_line(&conn, item_id, company_id)
    }

    fn set_inventory_quantity(
        &self,
        item_id: &ItemId,
        company_id: &CompanyId,
        quantity: i64,
    ) -> StoreResult<Option<InventoryLine>> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            "UPDATE inventory_items SET quantity = ?1, updated_at = ?2
             WHERE id = ?3 AND company_id = ?4",
            params![quantity, Utc::now().to_rfc3339(), item_id.0, company_id.0],
        )?;

        if updated == 0 {
            return Ok(None);
        }
        find_inventory_line(&conn, item_id, company_id)
    }

    fn find_order(&self, id: &OrderId) -> StoreResult<Option<Order>> {
        let conn = self.conn.lock().unwrap();
        find_order(&conn, id)
    }

    fn list_orders(
        &self,
        company_id: &CompanyId,
        user_id: Option<UserId>,
    ) -> StoreResult<Vec<Order>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            "SELECT id FROM orders
             WHERE company_id = ?1 AND (?2 IS NULL OR user_id = ?2)
             ORDER BY created_at",
        )?;
        let ids = stmt
            .query_map(params![company_id.0, user_id.map(|u| u.0)], |row| {
                row.get::<_, String>(0)
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut orders = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(order) = find_order(&conn, &OrderId(id))? {
                orders.push(order);
            }
        }
        Ok(orders)
    }

    fn begin(&self) -> StoreResult<Box<dyn StoreTx + '_>> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch("BEGIN IMMEDIATE;")?;
        Ok(Box::new(SqliteTx { conn, done: false }))
    }
}

/// A live SQLite transaction
///
/// Holds the connection lock for its whole lifetime; dropping it without
/// committing rolls back.
pub struct SqliteTx<'a> {
    conn: MutexGuard<'a, Connection>,
    done: bool,
}

impl StoreTx for SqliteTx<'_> {
    fn find_inventory_line(
        &self,
        item_id: &ItemId,
        company_id: &CompanyId,
    ) -> StoreResult<Option<InventoryLine>> {
        find_inventory_line(&self.conn, item_id, company_id)
    }

    fn decrement_inventory(
        &self,
        item_id: &ItemId,
        company_id: &CompanyId,
        by: i64,
    ) -> StoreResult<bool> {
        // Guarded update: never drives quantity below zero
        let updated = self.conn.execute(
            "UPDATE inventory_items SET quantity = quantity - ?1, updated_at = ?2
             WHERE id = ?3 AND company_id = ?4 AND quantity >= ?1",
            params![by, Utc::now().to_rfc3339(), item_id.0, company_id.0],
        )?;
        Ok(updated == 1)
    }

    fn insert_order(&self, order: &Order) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO orders (id, user_id, company_id, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                order.id.0,
                order.user_id.0,
                order.company_id.0,
                order.status.as_str(),
                order.created_at.to_rfc3339(),
                order.updated_at.to_rfc3339()
            ],
        )?;
        Ok(())
    }

    fn insert_order_line(&self, order_id: &OrderId, line: &OrderLine) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO order_items (order_id, item_id, quantity, price_at_time)
             VALUES (?1, ?2, ?3, ?4)",
            params![order_id.0, line.item_id.0, line.quantity, line.price_at_time],
        )?;
        Ok(())
    }

    fn find_order(&self, id: &OrderId) -> StoreResult<Option<Order>> {
        find_order(&self.conn, id)
    }

    fn update_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let updated = self.conn.execute(
            "UPDATE orders SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![status.as_str(), updated_at.to_rfc3339(), id.0],
        )?;
        Ok(updated == 1)
    }

    fn commit(mut self: Box<Self>) -> StoreResult<()> {
        self.conn.execute_batch("COMMIT;")?;
        self.done = true;
        Ok(())
    }
}

impl Drop for SqliteTx<'_> {
    fn drop(&mut self) {
        if !self.done {
            if let Err(e) = self.conn.execute_batch("ROLLBACK;") {
                tracing::error!(error = %e, "Transaction rollback failed");
            }
        }
    }
}
