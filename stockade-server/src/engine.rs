//! Inventory and order operations
//!
//! Order placement is all-or-nothing: the order header, its lines, and
//! every inventory decrement commit together or not at all. Inventory
//! quantity is the only contended resource; the guarded decrement inside
//! the store transaction keeps it from ever going negative.

use std::sync::Arc;

use chrono::Utc;
use stockade_core::OrderStatus;

use crate::error::ServerError;
use crate::store::{
    CompanyId, InventoryLine, ItemId, NewInventoryLine, Order, OrderId, OrderLine, Repository,
    UserId,
};

/// One requested line of an order
#[derive(Debug, Clone)]
pub struct OrderRequestLine {
    pub item_id: ItemId,
    pub quantity: i64,
}

pub struct OrderEngine<R: Repository> {
    repo: Arc<R>,
}

impl<R: Repository> Clone for OrderEngine<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
        }
    }
}

impl<R: Repository> OrderEngine<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Place an order, reserving stock for every requested line
    ///
    /// Lines are processed in the given order. A missing item or an
    /// insufficient quantity aborts the whole placement; nothing is
    /// persisted and no earlier decrement survives.
    pub fn place_order(
        &self,
        user_id: UserId,
        company_id: &CompanyId,
        requested: &[OrderRequestLine],
    ) -> Result<Order, ServerError> {
        if requested.is_empty() {
            return Err(ServerError::validation("order must contain at least one line"));
        }
        for line in requested {
            if line.quantity <= 0 {
                return Err(ServerError::validation(format!(
                    "quantity must be positive for item: {}",
                    line.item_id
                )));
            }
        }

        let now = Utc::now();
        let mut order = Order {
            id: OrderId::generate(),
            user_id,
            company_id: company_id.clone(),
            status: OrderStatus::Placed,
            created_at: now,
            updated_at: now,
            lines: Vec::with_capacity(requested.len()),
        };

        // Any early return below drops the transaction, rolling back the
        // order header and every decrement made so far
        let tx = self.repo.begin()?;
        tx.insert_order(&order)?;

        for req in requested {
            let stock = tx
                .find_inventory_line(&req.item_id, company_id)?
                .ok_or_else(|| {
                    ServerError::not_found(format!("item not found: {}", req.item_id))
                })?;

            if stock.quantity < req.quantity {
                return Err(ServerError::validation(format!(
                    "insufficient quantity for item: {}",
                    stock.name
                )));
            }

            let line = OrderLine {
                item_id: req.item_id.clone(),
                quantity: req.quantity,
                price_at_time: stock.price,
            };
            tx.insert_order_line(&order.id, &line)?;

            if !tx.decrement_inventory(&req.item_id, company_id, req.quantity)? {
                return Err(ServerError::validation(format!(
                    "insufficient quantity for item: {}",
                    stock.name
                )));
            }

            order.lines.push(line);
        }

        tx.commit()?;
        tracing::info!(order_id = %order.id, user_id = order.user_id.0, "Order placed");
        Ok(order)
    }

    /// Set an order's status
    ///
    /// Any status may follow any other; only set membership is enforced.
    pub fn update_status(
        &self,
        order_id: &OrderId,
        new_status: OrderStatus,
    ) -> Result<Order, ServerError> {
        let tx = self.repo.begin()?;

        let mut order = tx
            .find_order(order_id)?
            .ok_or_else(|| ServerError::not_found("order not found"))?;

        order.status = new_status;
        order.updated_at = Utc::now();
        tx.update_order_status(order_id, new_status, order.updated_at)?;
        tx.commit()?;

        tracing::info!(order_id = %order_id, status = %new_status, "Order status updated");
        Ok(order)
    }

    /// Add a new inventory line
    pub fn add_inventory_line(
        &self,
        new: NewInventoryLine,
    ) -> Result<InventoryLine, ServerError> {
        if new.name.trim().is_empty() {
            return Err(ServerError::validation("item name cannot be empty"));
        }
        if new.quantity < 0 {
            return Err(ServerError::validation("quantity cannot be negative"));
        }
        if new.price <= 0.0 {
            return Err(ServerError::validation("price must be positive"));
        }

        let line = self.repo.create_inventory_line(new)?;
        tracing::info!(item_id = %line.id, name = %line.name, "Inventory line added");
        Ok(line)
    }

    /// Replace an inventory line's quantity
    pub fn update_quantity(
        &self,
        item_id: &ItemId,
        company_id: &CompanyId,
        quantity: i64,
    ) -> Result<InventoryLine, ServerError> {
        if quantity < 0 {
            return Err(ServerError::validation("quantity cannot be negative"));
        }

        let line = self
            .repo
            .set_inventory_quantity(item_id, company_id, quantity)?
            .ok_or_else(|| ServerError::not_found("item not found"))?;

        tracing::info!(item_id = %item_id, quantity, "Inventory quantity updated");
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::sqlite::DEFAULT_COMPANY_ID;
    use crate::store::{NewUser, SqliteRepository};
    use stockade_core::Role;

    struct Fixture {
        engine: OrderEngine<SqliteRepository>,
        repo: Arc<SqliteRepository>,
        company: CompanyId,
        user: UserId,
    }

    fn fixture() -> Fixture {
        let repo = Arc::new(SqliteRepository::open_in_memory().unwrap());
        repo.ensure_default_company().unwrap();
        let user = repo
            .create_user(NewUser {
                email: "buyer@example.com".to_string(),
                password_hash: "hash".to_string(),
                forename: "Buyer".to_string(),
                surname: "One".to_string(),
                role: Role::Customer,
                company_id: CompanyId(DEFAULT_COMPANY_ID.to_string()),
            })
            .unwrap();

        Fixture {
            engine: OrderEngine::new(Arc::clone(&repo)),
            repo,
            company: CompanyId(DEFAULT_COMPANY_ID.to_string()),
            user: user.id,
        }
    }

    fn stock(f: &Fixture, name: &str, quantity: i64, price: f64) -> ItemId {
        f.engine
            .add_inventory_line(NewInventoryLine {
                name: name.to_string(),
                description: None,
                category: "general".to_string(),
                quantity,
                price,
                company_id: f.company.clone(),
            })
            .unwrap()
            .id
    }

    #[test]
    fn test_place_order_decrements_and_snapshots_price() {
        let f = fixture();
        let item = stock(&f, "Widget", 10, 9.99);

        let order = f
            .engine
            .place_order(
                f.user,
                &f.company,
                &[OrderRequestLine {
                    item_id: item.clone(),
                    quantity: 2,
                }],
            )
            .unwrap();

        assert_eq!(order.status, OrderStatus::Placed);
        assert_eq!(order.lines.len(), 1);
        assert_eq!(order.lines[0].quantity, 2);
        assert_eq!(order.lines[0].price_at_time, 9.99);

        let after = f.repo.find_inventory_line(&item, &f.company).unwrap().unwrap();
        assert_eq!(after.quantity, 8);

        // A later price change does not touch the snapshot
        let persisted = f.repo.find_order(&order.id).unwrap().unwrap();
        assert_eq!(persisted.lines[0].price_at_time, 9.99);
    }

    #[test]
    fn test_failed_order_leaves_no_trace() {
        let f = fixture();
        let item_a = stock(&f, "Widget A", 10, 1.00);
        let item_b = stock(&f, "Widget B", 5, 2.00);

        let result = f.engine.place_order(
            f.user,
            &f.company,
            &[
                OrderRequestLine {
                    item_id: item_a.clone(),
                    quantity: 3,
                },
                OrderRequestLine {
                    item_id: item_b.clone(),
                    quantity: 1000,
                },
            ],
        );

        assert!(matches!(result, Err(ServerError::Validation(_))));

        // Item A's decrement was rolled back with the rest
        let a = f.repo.find_inventory_line(&item_a, &f.company).unwrap().unwrap();
        assert_eq!(a.quantity, 10);
        let b = f.repo.find_inventory_line(&item_b, &f.company).unwrap().unwrap();
        assert_eq!(b.quantity, 5);

        // No partial order was persisted
        let orders = f.repo.list_orders(&f.company, None).unwrap();
        assert!(orders.is_empty());
    }

    #[test]
    fn test_missing_item_fails_with_not_found() {
        let f = fixture();
        let result = f.engine.place_order(
            f.user,
            &f.company,
            &[OrderRequestLine {
                item_id: ItemId("no-such-item".to_string()),
                quantity: 1,
            }],
        );
        assert!(matches!(result, Err(ServerError::NotFound(_))));
    }

    #[test]
    fn test_empty_order_rejected() {
        let f = fixture();
        let result = f.engine.place_order(f.user, &f.company, &[]);
        assert!(matches!(result, Err(ServerError::Validation(_))));
    }

    #[test]
    fn test_concurrent_single_unit_orders() {
        let f = fixture();
        let item = stock(&f, "Last One", 1, 5.00);

        let mut handles = Vec::new();
        for _ in 0..2 {
            let engine = f.engine.clone();
            let company = f.company.clone();
            let user = f.user;
            let item = item.clone();
            handles.push(std::thread::spawn(move || {
                engine.place_order(
                    user,
                    &company,
                    &[OrderRequestLine {
                        item_id: item,
                        quantity: 1,
                    }],
                )
            }));
        }

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let successes = results.iter().filter(|r| r.is_ok()).count();
        let validation_failures = results
            .iter()
            .filter(|r| matches!(r, Err(ServerError::Validation(_))))
            .count();

        assert_eq!(successes, 1);
        assert_eq!(validation_failures, 1);

        let after = f.repo.find_inventory_line(&item, &f.company).unwrap().unwrap();
        assert_eq!(after.quantity, 0);
    }

    #[test]
    fn test_update_status_is_permissive() {
        let f = fixture();
        let item = stock(&f, "Widget", 3, 1.00);
        let order = f
            .engine
            .place_order(
                f.user,
                &f.company,
                &[OrderRequestLine {
                    item_id: item,
                    quantity: 1,
                }],
            )
            .unwrap();

        let updated = f
            .engine
            .update_status(&order.id, OrderStatus::Completed)
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Completed);

        // Any status may follow any other, including moving backwards
        let reverted = f
            .engine
            .update_status(&order.id, OrderStatus::Placed)
            .unwrap();
        assert_eq!(reverted.status, OrderStatus::Placed);

        assert!(matches!(
            f.engine
                .update_status(&OrderId("missing".to_string()), OrderStatus::Shipped),
            Err(ServerError::NotFound(_))
        ));
    }
}
