use chrono::{DateTime, Utc};
use himgaon_catalog::Product;
use himgaon_shared::Masked;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::OrderError;

/// Order status in the lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Pending,
    Accepted,
    Rejected,
    Delivered,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Accepted,
        OrderStatus::Rejected,
        OrderStatus::Delivered,
    ];

    /// Stored and displayed form
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Accepted => "Accepted",
            OrderStatus::Rejected => "Rejected",
            OrderStatus::Delivered => "Delivered",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Rejected | OrderStatus::Delivered)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| OrderError::Validation(format!("unknown order status: {}", s)))
    }
}

/// Customer details captured at checkout. Email, phone and address are masked in logs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContactInfo {
    pub customer_name: String,
    pub email: Masked<String>,
    pub phone: Masked<String>,
    pub address: Masked<String>,
}

impl ContactInfo {
    pub fn new(
        customer_name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            customer_name: customer_name.into(),
            email: Masked::new(email.into()),
            phone: Masked::new(phone.into()),
            address: Masked::new(address.into()),
        }
    }

    /// Trims every field; all four are required.
    pub fn normalized(self) -> Result<Self, OrderError> {
        let contact = Self::new(
            self.customer_name.trim(),
            self.email.expose().trim(),
            self.phone.expose().trim(),
            self.address.expose().trim(),
        );

        let missing: Vec<&str> = [
            ("customer_name", contact.customer_name.as_str()),
            ("email", contact.email.expose().as_str()),
            ("phone", contact.phone.expose().as_str()),
            ("address", contact.address.expose().as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| field)
        .collect();

        if !missing.is_empty() {
            return Err(OrderError::Validation(format!(
                "all fields are required, missing: {}",
                missing.join(", ")
            )));
        }

        Ok(contact)
    }
}

/// One cart entry with the unit price captured when the product entered the cart.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: Uuid,
    pub quantity: i64,
    pub unit_price_paise: i64,
}

impl CartLine {
    pub fn new(product_id: Uuid, quantity: i64, unit_price_paise: i64) -> Self {
        Self {
            product_id,
            quantity,
            unit_price_paise,
        }
    }

    /// `None` when the product of price and quantity does not fit in an `i64`.
    pub fn line_total(&self) -> Option<i64> {
        self.unit_price_paise.checked_mul(self.quantity)
    }

    fn check(&self) -> Result<(), OrderError> {
        if self.quantity <= 0 {
            return Err(OrderError::Validation(format!(
                "quantity for product {} must be positive, got {}",
                self.product_id, self.quantity
            )));
        }
        if self.unit_price_paise <= 0 {
            return Err(OrderError::Validation(format!(
                "price for product {} must be positive",
                self.product_id
            )));
        }
        Ok(())
    }
}

fn too_large() -> OrderError {
    OrderError::Validation("order quantity or total is too large".into())
}

/// Ordered cart handed to checkout. The checkout borrows it for the duration of the call
/// and clears it only once the order has committed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a cart line by line, stopping at the first line [`Cart::add`] refuses.
    pub fn from_lines(lines: impl IntoIterator<Item = CartLine>) -> Result<Self, OrderError> {
        let mut cart = Cart::new();
        for line in lines {
            cart.add(line)?;
        }
        Ok(cart)
    }

    /// Adds a line, merging quantities when the product is already in the cart.
    /// The first captured price is kept for merged lines.
    ///
    /// Each line is checked on its own before merging, so a non-positive quantity is
    /// refused rather than netted against an earlier line. The cart is unchanged on error.
    pub fn add(&mut self, line: CartLine) -> Result<(), OrderError> {
        line.check()?;
        line.line_total().ok_or_else(too_large)?;

        match self.lines.iter_mut().find(|l| l.product_id == line.product_id) {
            Some(existing) => {
                let merged = CartLine {
                    quantity: existing
                        .quantity
                        .checked_add(line.quantity)
                        .ok_or_else(too_large)?,
                    ..*existing
                };
                merged.line_total().ok_or_else(too_large)?;
                *existing = merged;
            }
            None => self.lines.push(line),
        }
        Ok(())
    }

    pub fn remove(&mut self, product_id: Uuid) {
        self.lines.retain(|l| l.product_id != product_id);
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of the line totals, refused with `Validation` when it overflows.
    pub fn total_paise(&self) -> Result<i64, OrderError> {
        self.lines.iter().try_fold(0i64, |total, line| {
            line.line_total()
                .and_then(|line_total| total.checked_add(line_total))
                .ok_or_else(too_large)
        })
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Checks the cart can be turned into an order.
    pub fn validate(&self) -> Result<(), OrderError> {
        if self.lines.is_empty() {
            return Err(OrderError::EmptyCart);
        }
        // Deserialized carts bypass `add`, so every line is checked again here.
        for line in &self.lines {
            line.check()?;
        }
        self.total_paise()?;
        Ok(())
    }
}

/// A persisted customer order with its line items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub order_code: String,
    pub customer_name: String,
    pub email: Masked<String>,
    pub phone: Masked<String>,
    pub address: Masked<String>,
    pub total_paise: i64,
    pub status: OrderStatus,
    pub admin_notes: Option<String>,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Sum of the snapshotted line totals; equals `total_paise` for every stored order.
    pub fn items_total(&self) -> i64 {
        self.items.iter().map(OrderItem::line_total).sum()
    }

    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

/// An individual product within an order. Names and price are frozen at order time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub product_name_en: String,
    pub product_name_hi: String,
    pub quantity: i64,
    pub unit_price_paise: i64,
}

impl OrderItem {
    /// Snapshot of `product` for one cart line. The price comes from the cart, not the
    /// catalog, so a concurrent admin price edit cannot change what the customer agreed to.
    pub fn snapshot(order_id: Uuid, product: &Product, line: &CartLine) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            product_id: product.id,
            product_name_en: product.name_en.clone(),
            product_name_hi: product.name_hi.clone(),
            quantity: line.quantity,
            unit_price_paise: line.unit_price_paise,
        }
    }

    pub fn line_total(&self) -> i64 {
        self.unit_price_paise * self.quantity
    }
}

/// What checkout hands back on success.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlacedOrder {
    pub order_id: Uuid,
    pub order_code: String,
    pub total_paise: i64,
}
