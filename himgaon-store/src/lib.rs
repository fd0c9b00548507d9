pub mod app_config;
pub mod database;
pub mod ledger;
pub mod catalog_repo;
pub mod order_repo;

pub use database::DbClient;
pub use catalog_repo::StoreProductRepository;
pub use order_repo::StoreOrderRepository;
