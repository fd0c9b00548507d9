use uuid::Uuid;

use crate::models::OrderStatus;

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Invalid order input: {0}")]
    Validation(String),

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Product {0} is no longer available")]
    ProductUnavailable(Uuid),

    #[error("Insufficient stock for {product_name}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: Uuid,
        product_name: String,
        requested: i64,
        available: i64,
    },

    #[error("Order code {0} is already taken")]
    IdentifierCollision(String),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Order not found: {0}")]
    NotFound(String),

    #[error("Temporary storage failure: {0}")]
    Transient(String),

    #[error("Storage failure: {0}")]
    Storage(String),
}

impl OrderError {
    /// Infrastructure races and timeouts; the rest are caller mistakes or business rules.
    pub fn is_retryable(&self) -> bool {
        matches!(self, OrderError::IdentifierCollision(_) | OrderError::Transient(_))
    }
}
