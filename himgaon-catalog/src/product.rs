use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A sellable catalog entry. Prices are integer paise.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub name_en: String,
    pub name_hi: String,
    pub price_paise: i64,
    pub description_en: Option<String>,
    pub description_hi: Option<String>,
    pub image_url: Option<String>,
    pub stock: i64,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn is_in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Admin-supplied product fields for create and update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductDraft {
    pub name_en: String,
    pub name_hi: String,
    pub price_paise: i64,
    #[serde(default)]
    pub description_en: Option<String>,
    #[serde(default)]
    pub description_hi: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub stock: i64,
    #[serde(default)]
    pub category: Option<String>,
}

impl ProductDraft {
    /// Trims every text field, turns blank optionals into `None` and checks the catalog
    /// invariants: both names present, price positive, stock non-negative.
    pub fn normalized(self) -> Result<Self, ProductError> {
        let name_en = self.name_en.trim().to_string();
        let name_hi = self.name_hi.trim().to_string();

        if name_en.is_empty() || name_hi.is_empty() {
            return Err(ProductError::Invalid("both product names are required".into()));
        }
        if self.price_paise <= 0 {
            return Err(ProductError::Invalid(format!(
                "price must be positive, got {}",
                self.price_paise
            )));
        }
        if self.stock < 0 {
            return Err(ProductError::Invalid(format!(
                "stock cannot be negative, got {}",
                self.stock
            )));
        }

        Ok(Self {
            name_en,
            name_hi,
            price_paise: self.price_paise,
            description_en: non_blank(self.description_en),
            description_hi: non_blank(self.description_hi),
            image_url: non_blank(self.image_url),
            stock: self.stock,
            category: non_blank(self.category),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Catalog errors
#[derive(Debug, thiserror::Error)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(Uuid),

    #[error("Invalid product: {0}")]
    Invalid(String),

    /// Lock contention or a timeout; the call changed nothing and can be retried.
    #[error("Catalog temporarily unavailable: {0}")]
    Transient(String),

    #[error("Catalog storage failure: {0}")]
    Storage(String),
}
