use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use himgaon_catalog::inventory::{check_reservation, InventoryError};
use himgaon_catalog::Product;
use himgaon_core::repository::{Dashboard, OrderRepository};
use himgaon_order::code::OrderCodeGenerator;
use himgaon_order::{
    AdminCapability, Cart, ContactInfo, LifecycleAction, Order, OrderCode, OrderError, OrderItem,
    OrderStatus, PlacedOrder,
};
use himgaon_shared::pii::mask_tail;
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use crate::app_config::OrderSettings;
use crate::catalog_repo::{fetch_low_stock, fetch_product};
use crate::database::{bounded, is_busy};
use crate::ledger::{self, LedgerError};

const ORDER_COLUMNS: &str = "id, order_code, customer_name, email, phone, address, total_paise, status, admin_notes, created_at, updated_at";
const RECENT_ORDERS: i64 = 5;

/// Order placement, tracking and the admin lifecycle on top of SQLite.
///
/// Every write runs in a `BEGIN IMMEDIATE` transaction, which takes SQLite's single writer
/// lock up front. Concurrent checkouts and admin edits therefore serialize on the database,
/// and the conditional stock and status updates guard the same invariants at row level.
pub struct StoreOrderRepository {
    pool: SqlitePool,
    generator: OrderCodeGenerator,
    max_code_attempts: u32,
    operation_timeout: Duration,
}

impl StoreOrderRepository {
    pub fn new(
        pool: SqlitePool,
        settings: &OrderSettings,
        operation_timeout: Duration,
    ) -> Result<Self, OrderError> {
        let generator = OrderCodeGenerator::new(&settings.code_prefix)
            .map_err(|e| OrderError::Validation(e.to_string()))?;

        Ok(Self {
            pool,
            generator,
            max_code_attempts: settings.max_code_attempts.max(1),
            operation_timeout,
        })
    }

    async fn begin_write(&self) -> Result<Transaction<'static, Sqlite>, OrderError> {
        self.pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(storage_error)
    }

    /// One checkout attempt. Dropping the transaction on any early return rolls back the
    /// header, the items and every stock debit made so far.
    async fn try_place_order(
        &self,
        contact: &ContactInfo,
        cart: &Cart,
    ) -> Result<PlacedOrder, OrderError> {
        let mut tx = self.begin_write().await?;

        let last_code: Option<String> =
            sqlx::query_scalar("SELECT order_code FROM orders ORDER BY rowid DESC LIMIT 1")
                .fetch_optional(&mut *tx)
                .await
                .map_err(storage_error)?;
        let now = Utc::now();
        let code = self.generator.next_after(last_code.as_deref(), now.year());

        let order_id = Uuid::new_v4();
        let total_paise = cart.total_paise()?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, order_code, customer_name, email, phone, address, total_paise, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(order_id)
        .bind(code.as_str())
        .bind(&contact.customer_name)
        .bind(contact.email.expose())
        .bind(contact.phone.expose())
        .bind(contact.address.expose())
        .bind(total_paise)
        .bind(OrderStatus::Pending.as_str())
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| insert_error(e, &code))?;

        for (position, line) in cart.lines().iter().enumerate() {
            // Stock may have moved since the cart was built; read it again under the lock.
            let product = fetch_product(&mut tx, line.product_id)
                .await
                .map_err(storage_error)?
                .ok_or(OrderError::ProductUnavailable(line.product_id))?;

            check_reservation(product.id, product.stock, line.quantity)
                .map_err(|e| inventory_error(e, &product))?;

            let item = OrderItem::snapshot(order_id, &product, line);
            sqlx::query(
                r#"
                INSERT INTO order_items (id, order_id, product_id, product_name_en, product_name_hi, quantity, unit_price_paise, position)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(item.id)
            .bind(item.order_id)
            .bind(item.product_id)
            .bind(&item.product_name_en)
            .bind(&item.product_name_hi)
            .bind(item.quantity)
            .bind(item.unit_price_paise)
            .bind(position as i64)
            .execute(&mut *tx)
            .await
            .map_err(storage_error)?;

            ledger::reserve(&mut tx, product.id, line.quantity)
                .await
                .map_err(|e| ledger_error(e, &product))?;
        }

        tx.commit().await.map_err(storage_error)?;

        Ok(PlacedOrder {
            order_id,
            order_code: code.into_string(),
            total_paise,
        })
    }

    async fn transition(
        &self,
        admin: &AdminCapability,
        id: Uuid,
        action: LifecycleAction,
        notes: Option<&str>,
    ) -> Result<Order, OrderError> {
        let mut tx = self.begin_write().await?;

        let status: Option<String> = sqlx::query_scalar("SELECT status FROM orders WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(storage_error)?;
        let current: OrderStatus = status
            .ok_or_else(|| OrderError::NotFound(id.to_string()))?
            .parse()?;

        let target = action.apply(current).inspect_err(|e| {
            warn!(admin = admin.subject(), order_id = %id, "Refused lifecycle change: {}", e);
        })?;

        if action.restores_stock() {
            for item in fetch_items(&mut tx, id).await.map_err(storage_error)? {
                let restored = ledger::release(&mut tx, item.product_id, item.quantity)
                    .await
                    .map_err(|e| match e {
                        LedgerError::Database(e) => storage_error(e),
                        LedgerError::Inventory(e) => OrderError::Storage(e.to_string()),
                    })?;

                match restored {
                    Some(stock) => info!(
                        order_id = %id,
                        product_id = %item.product_id,
                        quantity = item.quantity,
                        stock,
                        "Stock restored"
                    ),
                    None => warn!(
                        order_id = %id,
                        product_id = %item.product_id,
                        "Product {} no longer exists, skipping restoration of {} units",
                        item.product_name_en,
                        item.quantity
                    ),
                }
            }
        }

        let now = Utc::now();
        let result = if action.records_notes() {
            let notes = notes.map(str::trim).filter(|n| !n.is_empty());
            sqlx::query(
                "UPDATE orders SET status = ?, admin_notes = ?, updated_at = ? WHERE id = ? AND status = ?",
            )
            .bind(target.as_str())
            .bind(notes)
            .bind(now)
            .bind(id)
            .bind(current.as_str())
            .execute(&mut *tx)
            .await
        } else {
            sqlx::query("UPDATE orders SET status = ?, updated_at = ? WHERE id = ? AND status = ?")
                .bind(target.as_str())
                .bind(now)
                .bind(id)
                .bind(current.as_str())
                .execute(&mut *tx)
                .await
        }
        .map_err(storage_error)?;

        if result.rows_affected() == 0 {
            return Err(OrderError::InvalidTransition {
                from: current,
                to: target,
            });
        }

        let order = load_order(&mut tx, id)
            .await?
            .ok_or_else(|| OrderError::NotFound(id.to_string()))?;
        tx.commit().await.map_err(storage_error)?;

        info!(
            admin = admin.subject(),
            order_code = %order.order_code,
            from = %current,
            to = %target,
            "Order status changed"
        );
        Ok(order)
    }

    async fn build_dashboard(&self, low_stock_threshold: i64) -> Result<Dashboard, OrderError> {
        let mut conn = self.pool.acquire().await.map_err(storage_error)?;

        let total_products: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&mut *conn)
            .await
            .map_err(storage_error)?;
        let total_orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&mut *conn)
            .await
            .map_err(storage_error)?;
        let pending_orders = count_with_status(&mut conn, OrderStatus::Pending).await?;
        let accepted_orders = count_with_status(&mut conn, OrderStatus::Accepted).await?;
        let low_stock_products = fetch_low_stock(&mut conn, low_stock_threshold)
            .await
            .map_err(storage_error)?;

        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM orders ORDER BY rowid DESC LIMIT ?",
            ORDER_COLUMNS
        ))
        .bind(RECENT_ORDERS)
        .fetch_all(&mut *conn)
        .await
        .map_err(storage_error)?;
        let recent_orders = with_items(&mut conn, rows).await?;

        Ok(Dashboard {
            total_products,
            total_orders,
            pending_orders,
            accepted_orders,
            low_stock_products,
            recent_orders,
        })
    }
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    order_code: String,
    customer_name: String,
    email: String,
    phone: String,
    address: String,
    total_paise: i64,
    status: String,
    admin_notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Result<Order, OrderError> {
        Ok(Order {
            id: self.id,
            order_code: self.order_code,
            customer_name: self.customer_name,
            email: self.email.into(),
            phone: self.phone.into(),
            address: self.address.into(),
            total_paise: self.total_paise,
            status: self.status.parse()?,
            admin_notes: self.admin_notes,
            items,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    id: Uuid,
    order_id: Uuid,
    product_id: Uuid,
    product_name_en: String,
    product_name_hi: String,
    quantity: i64,
    unit_price_paise: i64,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        OrderItem {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            product_name_en: row.product_name_en,
            product_name_hi: row.product_name_hi,
            quantity: row.quantity,
            unit_price_paise: row.unit_price_paise,
        }
    }
}

async fn fetch_items(
    conn: &mut SqliteConnection,
    order_id: Uuid,
) -> Result<Vec<OrderItem>, sqlx::Error> {
    let rows = sqlx::query_as::<_, OrderItemRow>(
        "SELECT id, order_id, product_id, product_name_en, product_name_hi, quantity, unit_price_paise FROM order_items WHERE order_id = ? ORDER BY position",
    )
    .bind(order_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows.into_iter().map(OrderItem::from).collect())
}

async fn with_items(
    conn: &mut SqliteConnection,
    rows: Vec<OrderRow>,
) -> Result<Vec<Order>, OrderError> {
    let mut orders = Vec::with_capacity(rows.len());
    for row in rows {
        let items = fetch_items(conn, row.id).await.map_err(storage_error)?;
        orders.push(row.into_order(items)?);
    }
    Ok(orders)
}

async fn load_order(conn: &mut SqliteConnection, id: Uuid) -> Result<Option<Order>, OrderError> {
    let row = sqlx::query_as::<_, OrderRow>(&format!(
        "SELECT {} FROM orders WHERE id = ?",
        ORDER_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(storage_error)?;

    match row {
        Some(row) => Ok(with_items(conn, vec![row]).await?.pop()),
        None => Ok(None),
    }
}

async fn count_with_status(
    conn: &mut SqliteConnection,
    status: OrderStatus,
) -> Result<i64, OrderError> {
    sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE status = ?")
        .bind(status.as_str())
        .fetch_one(&mut *conn)
        .await
        .map_err(storage_error)
}

fn storage_error(err: sqlx::Error) -> OrderError {
    if is_busy(&err) {
        OrderError::Transient(err.to_string())
    } else {
        OrderError::Storage(err.to_string())
    }
}

fn insert_error(err: sqlx::Error, code: &OrderCode) -> OrderError {
    match &err {
        sqlx::Error::Database(db)
            if db.is_unique_violation() && db.message().contains("order_code") =>
        {
            OrderError::IdentifierCollision(code.to_string())
        }
        _ => storage_error(err),
    }
}

fn inventory_error(err: InventoryError, product: &Product) -> OrderError {
    match err {
        InventoryError::InsufficientStock {
            product_id,
            requested,
            available,
        } => OrderError::InsufficientStock {
            product_id,
            product_name: product.name_en.clone(),
            requested,
            available,
        },
        InventoryError::NotFound(id) => OrderError::ProductUnavailable(id),
        InventoryError::InvalidQuantity(q) => {
            OrderError::Validation(format!("quantity must be positive, got {}", q))
        }
    }
}

fn ledger_error(err: LedgerError, product: &Product) -> OrderError {
    match err {
        LedgerError::Inventory(e) => inventory_error(e, product),
        LedgerError::Database(e) => storage_error(e),
    }
}

#[async_trait]
impl OrderRepository for StoreOrderRepository {
    async fn place_order(
        &self,
        contact: ContactInfo,
        cart: &mut Cart,
    ) -> Result<PlacedOrder, OrderError> {
        let contact = contact.normalized()?;
        cart.validate()?;

        let attempts = self.max_code_attempts;
        let snapshot: &Cart = cart;
        let placed = bounded(
            self.operation_timeout,
            "place_order",
            async {
                for attempt in 1..=attempts {
                    match self.try_place_order(&contact, snapshot).await {
                        Err(e) if e.is_retryable() && attempt < attempts => {
                            warn!("Checkout attempt {}/{} failed, retrying: {}", attempt, attempts, e);
                        }
                        Err(OrderError::IdentifierCollision(code)) => {
                            return Err(OrderError::Transient(format!(
                                "order code {} still taken after {} attempts",
                                code, attempts
                            )));
                        }
                        other => return other,
                    }
                }
                Err(OrderError::Transient(format!(
                    "checkout failed after {} attempts",
                    attempts
                )))
            },
            OrderError::Transient,
        )
        .await
        .inspect_err(|e| match e {
            OrderError::InsufficientStock { .. } | OrderError::ProductUnavailable(_) => {
                warn!("Checkout refused: {}", e)
            }
            _ => warn!("Checkout failed: {}", e),
        })?;

        cart.clear();
        info!(
            order_code = %placed.order_code,
            total_paise = placed.total_paise,
            customer = %contact.customer_name,
            phone = %mask_tail(contact.phone.expose(), 4),
            "Order placed"
        );
        Ok(placed)
    }

    async fn track_order(&self, order_code: &str, phone: &str) -> Result<Order, OrderError> {
        let code = OrderCode::normalize(order_code);
        let phone = phone.trim();
        if code.as_str().is_empty() || phone.is_empty() {
            return Err(OrderError::Validation(
                "order code and phone number are both required".into(),
            ));
        }

        bounded(
            self.operation_timeout,
            "track_order",
            async {
                let mut conn = self.pool.acquire().await.map_err(storage_error)?;
                let id: Option<Uuid> =
                    sqlx::query_scalar("SELECT id FROM orders WHERE order_code = ? AND phone = ?")
                        .bind(code.as_str())
                        .bind(phone)
                        .fetch_optional(&mut *conn)
                        .await
                        .map_err(storage_error)?;

                match id {
                    Some(id) => load_order(&mut conn, id)
                        .await?
                        .ok_or_else(|| OrderError::NotFound(code.to_string())),
                    None => Err(OrderError::NotFound(code.to_string())),
                }
            },
            OrderError::Transient,
        )
        .await
    }

    async fn get_order_by_code(&self, order_code: &str) -> Result<Option<Order>, OrderError> {
        let code = OrderCode::normalize(order_code);

        bounded(
            self.operation_timeout,
            "get_order_by_code",
            async {
                let mut conn = self.pool.acquire().await.map_err(storage_error)?;
                let id: Option<Uuid> =
                    sqlx::query_scalar("SELECT id FROM orders WHERE order_code = ?")
                        .bind(code.as_str())
                        .fetch_optional(&mut *conn)
                        .await
                        .map_err(storage_error)?;

                match id {
                    Some(id) => load_order(&mut conn, id).await,
                    None => Ok(None),
                }
            },
            OrderError::Transient,
        )
        .await
    }

    async fn get_order(
        &self,
        _admin: &AdminCapability,
        id: Uuid,
    ) -> Result<Option<Order>, OrderError> {
        bounded(
            self.operation_timeout,
            "get_order",
            async {
                let mut conn = self.pool.acquire().await.map_err(storage_error)?;
                load_order(&mut conn, id).await
            },
            OrderError::Transient,
        )
        .await
    }

    async fn list_orders(
        &self,
        _admin: &AdminCapability,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, OrderError> {
        bounded(
            self.operation_timeout,
            "list_orders",
            async {
                let mut conn = self.pool.acquire().await.map_err(storage_error)?;
                let rows = sqlx::query_as::<_, OrderRow>(&format!(
                    "SELECT {} FROM orders WHERE (?1 IS NULL OR status = ?1) ORDER BY rowid DESC",
                    ORDER_COLUMNS
                ))
                .bind(status.map(|s| s.as_str()))
                .fetch_all(&mut *conn)
                .await
                .map_err(storage_error)?;

                with_items(&mut conn, rows).await
            },
            OrderError::Transient,
        )
        .await
    }

    async fn accept_order(
        &self,
        admin: &AdminCapability,
        id: Uuid,
        notes: &str,
    ) -> Result<Order, OrderError> {
        bounded(
            self.operation_timeout,
            "accept_order",
            self.transition(admin, id, LifecycleAction::Accept, Some(notes)),
            OrderError::Transient,
        )
        .await
    }

    async fn reject_order(
        &self,
        admin: &AdminCapability,
        id: Uuid,
        notes: &str,
    ) -> Result<Order, OrderError> {
        bounded(
            self.operation_timeout,
            "reject_order",
            self.transition(admin, id, LifecycleAction::Reject, Some(notes)),
            OrderError::Transient,
        )
        .await
    }

    async fn deliver_order(&self, admin: &AdminCapability, id: Uuid) -> Result<Order, OrderError> {
        bounded(
            self.operation_timeout,
            "deliver_order",
            self.transition(admin, id, LifecycleAction::Deliver, None),
            OrderError::Transient,
        )
        .await
    }

    async fn dashboard(
        &self,
        _admin: &AdminCapability,
        low_stock_threshold: i64,
    ) -> Result<Dashboard, OrderError> {
        bounded(
            self.operation_timeout,
            "dashboard",
            self.build_dashboard(low_stock_threshold),
            OrderError::Transient,
        )
        .await
    }
}
