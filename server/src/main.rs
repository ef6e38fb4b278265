use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use eventhub_server::routes::create_routes;
use eventhub_server::store::PgStore;
use eventhub_server::{AppState, Config};

const DEFAULT_LOG_FILTER: &str = "eventhub_server=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::from_env().context("Invalid configuration")?;

    let store = PgStore::connect(&config.database_url, config.max_connections)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Successfully connected to database");

    store.migrate().await.context("Failed to run migrations")?;
    tracing::info!("Migrations run successfully");

    let addr = config.bind_addr;
    let app = create_routes(AppState::new(Arc::new(store), config));

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Server running at http://{}", addr);

    axum::serve(listener, app).await.context("Server failed")?;
    Ok(())
}
