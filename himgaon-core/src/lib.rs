pub mod repository;

pub use repository::{Dashboard, OrderRepository, ProductRepository};
