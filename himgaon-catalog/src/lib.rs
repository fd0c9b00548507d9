pub mod product;
pub mod inventory;
pub mod seed;

pub use product::{Product, ProductDraft, ProductError};
pub use inventory::{InventoryError, DEFAULT_LOW_STOCK_THRESHOLD};
