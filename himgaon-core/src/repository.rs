use async_trait::async_trait;
use himgaon_catalog::{Product, ProductDraft, ProductError};
use himgaon_order::{AdminCapability, Cart, ContactInfo, Order, OrderError, OrderStatus, PlacedOrder};
use serde::Serialize;
use uuid::Uuid;

/// Repository trait for product catalog access
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn get_product(&self, id: Uuid) -> Result<Option<Product>, ProductError>;

    async fn list_products(&self) -> Result<Vec<Product>, ProductError>;

    async fn create_product(
        &self,
        admin: &AdminCapability,
        draft: ProductDraft,
    ) -> Result<Product, ProductError>;

    /// Overwrites every editable field, stock included.
    async fn update_product(
        &self,
        admin: &AdminCapability,
        id: Uuid,
        draft: ProductDraft,
    ) -> Result<Product, ProductError>;

    async fn delete_product(&self, admin: &AdminCapability, id: Uuid) -> Result<(), ProductError>;

    /// Products with stock strictly below `threshold`, lowest first.
    async fn low_stock_products(&self, threshold: i64) -> Result<Vec<Product>, ProductError>;
}

/// Repository trait for order placement, tracking and the admin lifecycle
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Turns `cart` into a Pending order in one transaction and clears it on success.
    /// On any error nothing is written and the cart is left as it was.
    async fn place_order(
        &self,
        contact: ContactInfo,
        cart: &mut Cart,
    ) -> Result<PlacedOrder, OrderError>;

    /// Customer lookup; both the code and the phone number must match.
    async fn track_order(&self, order_code: &str, phone: &str) -> Result<Order, OrderError>;

    async fn get_order_by_code(&self, order_code: &str) -> Result<Option<Order>, OrderError>;

    async fn get_order(
        &self,
        admin: &AdminCapability,
        id: Uuid,
    ) -> Result<Option<Order>, OrderError>;

    /// Newest first, optionally filtered by status.
    async fn list_orders(
        &self,
        admin: &AdminCapability,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, OrderError>;

    async fn accept_order(
        &self,
        admin: &AdminCapability,
        id: Uuid,
        notes: &str,
    ) -> Result<Order, OrderError>;

    /// Rejects a Pending order and gives every line's quantity back to stock.
    async fn reject_order(
        &self,
        admin: &AdminCapability,
        id: Uuid,
        notes: &str,
    ) -> Result<Order, OrderError>;

    async fn deliver_order(&self, admin: &AdminCapability, id: Uuid) -> Result<Order, OrderError>;

    async fn dashboard(
        &self,
        admin: &AdminCapability,
        low_stock_threshold: i64,
    ) -> Result<Dashboard, OrderError>;
}

/// Admin overview counts
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub total_products: i64,
    pub total_orders: i64,
    pub pending_orders: i64,
    pub accepted_orders: i64,
    pub low_stock_products: Vec<Product>,
    pub recent_orders: Vec<Order>,
}
