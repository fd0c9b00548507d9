use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub orders: OrderSettings,
    #[serde(default)]
    pub catalog: CatalogSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout_ms")]
    pub acquire_timeout_ms: u64,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// Upper bound for one repository call, retries included.
    #[serde(default = "default_operation_timeout_ms")]
    pub operation_timeout_ms: u64,
}

impl DatabaseConfig {
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: default_max_connections(),
            acquire_timeout_ms: default_acquire_timeout_ms(),
            busy_timeout_ms: default_busy_timeout_ms(),
            operation_timeout_ms: default_operation_timeout_ms(),
        }
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
    pub admin_username: String,
    /// Argon2 PHC string; an empty value disables admin login.
    #[serde(default)]
    pub admin_password_hash: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OrderSettings {
    #[serde(default = "default_code_prefix")]
    pub code_prefix: String,
    #[serde(default = "default_max_code_attempts")]
    pub max_code_attempts: u32,
}

impl Default for OrderSettings {
    fn default() -> Self {
        Self {
            code_prefix: default_code_prefix(),
            max_code_attempts: default_max_code_attempts(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogSettings {
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: i64,
    #[serde(default)]
    pub seed_demo_products: bool,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            low_stock_threshold: default_low_stock_threshold(),
            seed_demo_products: false,
        }
    }
}

fn default_max_connections() -> u32 { 5 }
fn default_acquire_timeout_ms() -> u64 { 3_000 }
fn default_busy_timeout_ms() -> u64 { 5_000 }
fn default_operation_timeout_ms() -> u64 { 10_000 }
fn default_code_prefix() -> String { himgaon_order::code::DEFAULT_PREFIX.to_string() }
fn default_max_code_attempts() -> u32 { 3 }
fn default_low_stock_threshold() -> i64 { himgaon_catalog::DEFAULT_LOW_STOCK_THRESHOLD }

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Machine-local secrets, never checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg.. `HIMGAON__DATABASE__URL=sqlite://orders.db`
            .add_source(config::Environment::with_prefix("HIMGAON").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_fall_back_to_defaults() {
        let s = config::Config::builder()
            .add_source(config::File::from_str(
                r#"
                [server]
                port = 8080

                [database]
                url = "sqlite::memory:"

                [auth]
                jwt_secret = "secret"
                jwt_expiration_seconds = 60
                admin_username = "admin"
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();

        let config: Config = s.try_deserialize().unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.database.operation_timeout(), Duration::from_secs(10));
        assert_eq!(config.orders.code_prefix, "HGD");
        assert_eq!(config.orders.max_code_attempts, 3);
        assert_eq!(config.catalog.low_stock_threshold, 10);
        assert!(config.auth.admin_password_hash.is_empty());
    }
}
