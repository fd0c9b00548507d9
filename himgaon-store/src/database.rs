use chrono::Utc;
use himgaon_catalog::seed::dairy_catalog;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::app_config::DatabaseConfig;

#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<Sqlite>,
}

impl DbClient {
    pub async fn new(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_millis(config.acquire_timeout_ms))
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Migrations completed successfully.");
        Ok(())
    }

    /// Loads the starter dairy catalog when the products table is empty.
    /// Returns how many products were inserted.
    pub async fn seed_demo_products(&self) -> Result<usize, sqlx::Error> {
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&mut *tx)
            .await?;
        if existing > 0 {
            info!("Catalog already contains {} products, skipping seed", existing);
            return Ok(0);
        }

        let catalog = dairy_catalog();
        let now = Utc::now();
        for draft in &catalog {
            sqlx::query(
                r#"
                INSERT INTO products (id, name_en, name_hi, price_paise, description_en, description_hi, image_url, stock, category, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(Uuid::new_v4())
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
            .await?;
        }

        tx.commit().await?;
        info!("Seeded catalog with {} HimGaon Dairy products", catalog.len());
        Ok(catalog.len())
    }
}

/// Runs `fut` with an upper bound. An expired bound drops the future, which rolls back any
/// transaction it had open.
pub(crate) async fn bounded<T, E, F>(
    limit: Duration,
    operation: &str,
    fut: F,
    on_timeout: impl FnOnce(String) -> E,
) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!("{} timed out after {:?}", operation, limit);
            Err(on_timeout(format!("{} timed out after {:?}", operation, limit)))
        }
    }
}

/// SQLITE_BUSY and SQLITE_LOCKED, including their extended codes.
pub(crate) fn is_busy(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db
            .code()
            .and_then(|code| code.parse::<i32>().ok())
            .is_some_and(|code| matches!(code & 0xff, 5 | 6)),
        sqlx::Error::PoolTimedOut => true,
        _ => false,
    }
}
