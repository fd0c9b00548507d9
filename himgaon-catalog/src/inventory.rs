use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Products below this many units show up on the admin dashboard.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 10;

/// Direction of a stock movement recorded by the inventory ledger.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockMovement {
    /// Order placement
    Debit,
    /// Rejection compensation
    Credit,
}

/// Checks that `requested` units can be taken from `available`.
/// Returns the stock that would remain after the debit.
pub fn check_reservation(
    product_id: Uuid,
    available: i64,
    requested: i64,
) -> Result<i64, InventoryError> {
    if requested <= 0 {
        return Err(InventoryError::InvalidQuantity(requested));
    }
    if requested > available {
        return Err(InventoryError::InsufficientStock {
            product_id,
            requested,
            available,
        });
    }
    Ok(available - requested)
}

pub fn is_low_stock(stock: i64, threshold: i64) -> bool {
    stock < threshold
}

#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("Inventory not found for product {0}")]
    NotFound(Uuid),

    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: Uuid,
        requested: i64,
        available: i64,
    },

    #[error("Quantity must be positive, got {0}")]
    InvalidQuantity(i64),
}
