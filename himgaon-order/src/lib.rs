pub mod models;
pub mod manager;
pub mod code;
pub mod capability;
pub mod error;

pub use models::{Cart, CartLine, ContactInfo, Order, OrderItem, OrderStatus, PlacedOrder};
pub use manager::LifecycleAction;
pub use code::{OrderCode, OrderCodeGenerator};
pub use capability::AdminCapability;
pub use error::OrderError;
