//! Stock debits and credits. Both run as single statements on the product row, so they are
//! atomic with respect to every other writer of that row.

use chrono::Utc;
use himgaon_catalog::inventory::{InventoryError, StockMovement};
use sqlx::SqliteConnection;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Check-and-decrement in one conditional update. Returns the remaining stock.
pub async fn reserve(
    conn: &mut SqliteConnection,
    product_id: Uuid,
    quantity: i64,
) -> Result<i64, LedgerError> {
    if quantity <= 0 {
        return Err(InventoryError::InvalidQuantity(quantity).into());
    }

    let remaining: Option<i64> = sqlx::query_scalar(
        "UPDATE products SET stock = stock - ?1, updated_at = ?2 WHERE id = ?3 AND stock >= ?1 RETURNING stock",
    )
    .bind(quantity)
    .bind(Utc::now())
    .bind(product_id)
    .fetch_optional(&mut *conn)
    .await?;

    match remaining {
        Some(stock) => {
            debug!(movement = ?StockMovement::Debit, %product_id, quantity, stock, "stock moved");
            Ok(stock)
        }
        None => {
            let available: Option<i64> = sqlx::query_scalar("SELECT stock FROM products WHERE id = ?")
                .bind(product_id)
                .fetch_optional(&mut *conn)
                .await?;

            match available {
                Some(available) => Err(InventoryError::InsufficientStock {
                    product_id,
                    requested: quantity,
                    available,
                }
                .into()),
                None => Err(InventoryError::NotFound(product_id).into()),
            }
        }
    }
}

/// Unconditional credit. Returns the new stock, or `None` when the product no longer exists.
pub async fn release(
    conn: &mut SqliteConnection,
    product_id: Uuid,
    quantity: i64,
) -> Result<Option<i64>, LedgerError> {
    if quantity <= 0 {
        return Err(InventoryError::InvalidQuantity(quantity).into());
    }

    let stock: Option<i64> = sqlx::query_scalar(
        "UPDATE products SET stock = stock + ?1, updated_at = ?2 WHERE id = ?3 RETURNING stock",
    )
    .bind(quantity)
    .bind(Utc::now())
    .bind(product_id)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(stock) = stock {
        debug!(movement = ?StockMovement::Credit, %product_id, quantity, stock, "stock moved");
    }
    Ok(stock)
}
