use anyhow::Context;
use himgaon_api::{app, auth::hash_password, AppState};
use himgaon_store::{app_config::Config, DbClient};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // `himgaon-api hash-password <password>` prints a value for auth.admin_password_hash
    let args: Vec<String> = std::env::args().collect();
    if let [_, command, password] = args.as_slice() {
        if command == "hash-password" {
            let hash = hash_password(password)
                .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
            println!("{}", hash);
            return Ok(());
        }
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "himgaon_api=debug,himgaon_store=debug,tower_http=debug,axum::rejection=trace"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting HimGaon API on port {}", config.server.port);

    let db = DbClient::new(&config.database)
        .await
        .context("Failed to connect to database")?;
    db.migrate().await.context("Failed to run migrations")?;

    if config.catalog.seed_demo_products {
        let inserted = db
            .seed_demo_products()
            .await
            .context("Failed to seed demo products")?;
        if inserted > 0 {
            tracing::info!("Seeded {} demo products", inserted);
        }
    }

    if config.auth.admin_password_hash.is_empty() {
        tracing::warn!("auth.admin_password_hash is empty, admin login is disabled");
    }

    let app_state = AppState::build(&db, &config).context("Invalid order settings")?;
    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
