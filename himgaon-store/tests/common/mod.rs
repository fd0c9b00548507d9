#![allow(dead_code)]

use himgaon_catalog::{Product, ProductDraft};
use himgaon_core::repository::ProductRepository;
use himgaon_order::{AdminCapability, Cart, CartLine, ContactInfo};
use himgaon_store::app_config::{DatabaseConfig, OrderSettings};
use himgaon_store::{DbClient, StoreOrderRepository, StoreProductRepository};
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

pub struct TestStore {
    // Keeps the database file alive for the duration of the test
    _dir: TempDir,
    pub db: DbClient,
    pub products: StoreProductRepository,
    pub orders: Arc<StoreOrderRepository>,
    pub admin: AdminCapability,
}

pub async fn setup() -> TestStore {
    setup_with(|_| {}).await
}

/// Like [`setup`], with the database settings adjusted before the pool is built.
pub async fn setup_with(tune: impl FnOnce(&mut DatabaseConfig)) -> TestStore {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("himgaon-test.db").display());
    let mut config = DatabaseConfig::for_url(url);
    tune(&mut config);

    let db = DbClient::new(&config).await.unwrap();
    db.migrate().await.unwrap();

    let products = StoreProductRepository::new(db.pool.clone(), config.operation_timeout());
    let orders = StoreOrderRepository::new(
        db.pool.clone(),
        &OrderSettings::default(),
        config.operation_timeout(),
    )
    .unwrap();

    TestStore {
        _dir: dir,
        db,
        products,
        orders: Arc::new(orders),
        admin: AdminCapability::grant("test-admin"),
    }
}

impl TestStore {
    pub async fn add_product(&self, name: &str, price_paise: i64, stock: i64) -> Product {
        self.products
            .create_product(
                &self.admin,
                ProductDraft {
                    name_en: name.to_string(),
                    name_hi: format!("{} (hi)", name),
                    price_paise,
                    description_en: None,
                    description_hi: None,
                    image_url: None,
                    stock,
                    category: Some("dairy".into()),
                },
            )
            .await
            .unwrap()
    }

    pub async fn stock_of(&self, id: Uuid) -> i64 {
        self.products.get_product(id).await.unwrap().unwrap().stock
    }

    pub async fn order_count(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.db.pool)
            .await
            .unwrap()
    }

    pub async fn item_count(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM order_items")
            .fetch_one(&self.db.pool)
            .await
            .unwrap()
    }
}

pub fn contact() -> ContactInfo {
    ContactInfo::new(
        "Asha Joshi",
        "asha@example.com",
        "9876543210",
        "Near Bus Stand, Pithoragarh",
    )
}

pub fn cart_of(lines: &[(&Product, i64)]) -> Cart {
    Cart::from_lines(
        lines
            .iter()
            .map(|(product, qty)| CartLine::new(product.id, *qty, product.price_paise)),
    )
    .unwrap()
}
