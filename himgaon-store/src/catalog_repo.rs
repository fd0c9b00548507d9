use async_trait::async_trait;
use chrono::{DateTime, Utc};
use himgaon_catalog::{Product, ProductDraft, ProductError};
use himgaon_core::repository::ProductRepository;
use himgaon_order::AdminCapability;
use sqlx::{SqliteConnection, SqlitePool};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::database::{bounded, is_busy};

pub(crate) const PRODUCT_COLUMNS: &str = "id, name_en, name_hi, price_paise, description_en, description_hi, image_url, stock, category, created_at, updated_at";

pub struct StoreProductRepository {
    pool: SqlitePool,
    operation_timeout: Duration,
}

impl StoreProductRepository {
    pub fn new(pool: SqlitePool, operation_timeout: Duration) -> Self {
        Self {
            pool,
            operation_timeout,
        }
    }
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
pub(crate) struct ProductRow {
    id: Uuid,
    name_en: String,
    name_hi: String,
    price_paise: i64,
    description_en: Option<String>,
    description_hi: Option<String>,
    image_url: Option<String>,
    stock: i64,
    category: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name_en: row.name_en,
            name_hi: row.name_hi,
            price_paise: row.price_paise,
            description_en: row.description_en,
            description_hi: row.description_hi,
            image_url: row.image_url,
            stock: row.stock,
            category: row.category,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub(crate) async fn fetch_product(
    conn: &mut SqliteConnection,
    id: Uuid,
) -> Result<Option<Product>, sqlx::Error> {
    let row = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {} FROM products WHERE id = ?",
        PRODUCT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.map(Product::from))
}

pub(crate) async fn fetch_low_stock(
    conn: &mut SqliteConnection,
    threshold: i64,
) -> Result<Vec<Product>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {} FROM products WHERE stock < ? ORDER BY stock ASC, name_en ASC",
        PRODUCT_COLUMNS
    ))
    .bind(threshold)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows.into_iter().map(Product::from).collect())
}

fn storage_error(err: sqlx::Error) -> ProductError {
    if is_busy(&err) {
        ProductError::Transient(err.to_string())
    } else {
        ProductError::Storage(err.to_string())
    }
}

#[async_trait]
impl ProductRepository for StoreProductRepository {
    async fn get_product(&self, id: Uuid) -> Result<Option<Product>, ProductError> {
        bounded(
            self.operation_timeout,
            "get_product",
            async {
                let mut conn = self.pool.acquire().await.map_err(storage_error)?;
                fetch_product(&mut conn, id).await.map_err(storage_error)
            },
            ProductError::Transient,
        )
        .await
    }

    async fn list_products(&self) -> Result<Vec<Product>, ProductError> {
        bounded(
            self.operation_timeout,
            "list_products",
            async {
                let rows = sqlx::query_as::<_, ProductRow>(&format!(
                    "SELECT {} FROM products ORDER BY rowid ASC",
                    PRODUCT_COLUMNS
                ))
                .fetch_all(&self.pool)
                .await
                .map_err(storage_error)?;

                Ok::<_, ProductError>(rows.into_iter().map(Product::from).collect())
            },
            ProductError::Transient,
        )
        .await
    }

    async fn create_product(
        &self,
        admin: &AdminCapability,
        draft: ProductDraft,
    ) -> Result<Product, ProductError> {
        let draft = draft.normalized()?;

        bounded(
            self.operation_timeout,
            "create_product",
            async {
                let id = Uuid::new_v4();
                let now = Utc::now();
                let mut tx = self
                    .pool
                    .begin_with("BEGIN IMMEDIATE")
                    .await
                    .map_err(storage_error)?;

                sqlx::query(
                    r#"
                    INSERT INTO products (id, name_en, name_hi, price_paise, description_en, description_hi, image_url, stock, category, created_at, updated_at)
                    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(id)
                .bind(&draft.name_en)
                .bind(&draft.name_hi)
                .bind(draft.price_paise)
                .bind(&draft.description_en)
                .bind(&draft.description_hi)
                .bind(&draft.image_url)
                .bind(draft.stock)
                .bind(&draft.category)
                .bind(now)
                .bind(now)
                .execute(&mut *tx)
                .await
                .map_err(storage_error)?;

                let product = fetch_product(&mut tx, id)
                    .await
                    .map_err(storage_error)?
                    .ok_or(ProductError::NotFound(id))?;
                tx.commit().await.map_err(storage_error)?;

                info!(admin = admin.subject(), product_id = %id, "Product {} created", product.name_en);
                Ok::<_, ProductError>(product)
            },
            ProductError::Transient,
        )
        .await
    }

    async fn update_product(
        &self,
        admin: &AdminCapability,
        id: Uuid,
        draft: ProductDraft,
    ) -> Result<Product, ProductError> {
        let draft = draft.normalized()?;

        bounded(
            self.operation_timeout,
            "update_product",
            async {
                // Same writer lock as checkout, so a stock overwrite never interleaves
                // with an order's check-and-debit.
                let mut tx = self
                    .pool
                    .begin_with("BEGIN IMMEDIATE")
                    .await
                    .map_err(storage_error)?;

                let result = sqlx::query(
                    r#"
                    UPDATE products
                    SET name_en = ?, name_hi = ?, price_paise = ?, description_en = ?, description_hi = ?,
                        image_url = ?, stock = ?, category = ?, updated_at = ?
                    WHERE id = ?
                    "#,
                )
                .bind(&draft.name_en)
                .bind(&draft.name_hi)
                .bind(draft.price_paise)
                .bind(&draft.description_en)
                .bind(&draft.description_hi)
                .bind(&draft.image_url)
                .bind(draft.stock)
                .bind(&draft.category)
                .bind(Utc::now())
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(storage_error)?;

                if result.rows_affected() == 0 {
                    return Err(ProductError::NotFound(id));
                }

                let product = fetch_product(&mut tx, id)
                    .await
                    .map_err(storage_error)?
                    .ok_or(ProductError::NotFound(id))?;
                tx.commit().await.map_err(storage_error)?;

                info!(admin = admin.subject(), product_id = %id, stock = product.stock, "Product updated");
                Ok::<_, ProductError>(product)
            },
            ProductError::Transient,
        )
        .await
    }

    async fn delete_product(&self, admin: &AdminCapability, id: Uuid) -> Result<(), ProductError> {
        bounded(
            self.operation_timeout,
            "delete_product",
            async {
                let result = sqlx::query("DELETE FROM products WHERE id = ?")
                    .bind(id)
                    .execute(&self.pool)
                    .await
                    .map_err(storage_error)?;

                if result.rows_affected() == 0 {
                    return Err(ProductError::NotFound(id));
                }

                info!(admin = admin.subject(), product_id = %id, "Product deleted");
                Ok::<_, ProductError>(())
            },
            ProductError::Transient,
        )
        .await
    }

    async fn low_stock_products(&self, threshold: i64) -> Result<Vec<Product>, ProductError> {
        bounded(
            self.operation_timeout,
            "low_stock_products",
            async {
                let mut conn = self.pool.acquire().await.map_err(storage_error)?;
                fetch_low_stock(&mut conn, threshold)
                    .await
                    .map_err(storage_error)
            },
            ProductError::Transient,
        )
        .await
    }
}
