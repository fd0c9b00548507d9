use std::sync::Arc;

use himgaon_core::repository::{OrderRepository, ProductRepository};
use himgaon_order::OrderError;
use himgaon_store::app_config::{self, Config};
use himgaon_store::{DbClient, StoreOrderRepository, StoreProductRepository};

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
    pub admin_username: String,
    /// Argon2 PHC string. Empty disables admin login.
    pub admin_password_hash: String,
}

impl From<&app_config::AuthConfig> for AuthConfig {
    fn from(config: &app_config::AuthConfig) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            expiration: config.jwt_expiration_seconds,
            admin_username: config.admin_username.clone(),
            admin_password_hash: config.admin_password_hash.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub products: Arc<dyn ProductRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub auth: AuthConfig,
    pub low_stock_threshold: i64,
}

impl AppState {
    /// Wires the SQLite repositories from loaded configuration.
    pub fn build(db: &DbClient, config: &Config) -> Result<Self, OrderError> {
        let timeout = config.database.operation_timeout();
        let orders = StoreOrderRepository::new(db.pool.clone(), &config.orders, timeout)?;

        Ok(Self {
            products: Arc::new(StoreProductRepository::new(db.pool.clone(), timeout)),
            orders: Arc::new(orders),
            auth: AuthConfig::from(&config.auth),
            low_stock_threshold: config.catalog.low_stock_threshold,
        })
    }
}
