pub mod api;
pub mod config;
pub mod credentials;
pub mod dashboard;
pub mod db;
pub mod models;
pub mod records;
pub mod seeder;
pub mod session;
pub mod views;

use tracing_subscriber::EnvFilter;

use crate::api::{start_server_on, ApiContext};
use crate::config::{AppConfig, ConfigError, StoreConfig};
use crate::db::DatabaseError;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Resolve configuration, seed the inventory, then serve until Ctrl-C.
pub async fn run() -> Result<(), StartupError> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = AppConfig::from_env()?;
    match &config.store {
        StoreConfig::Firestore { key, source } => tracing::info!(
            backend = "firestore",
            project = %key.project_id,
            credentials = %source,
            "Document store selected"
        ),
        other => tracing::info!(backend = other.backend_name(), "Document store selected"),
    }

    let store = db::connect(&config.store)?;
    seeder::seed_inventory(store.as_ref()).await?;

    let ctx = ApiContext::from_config(&config, store);
    let server = start_server_on(ctx, config.bind_addr).await?;
    tracing::info!(addr = %server.session.server_addr, "Ward dashboard ready");

    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "Failed to listen for Ctrl-C");
    }
    server.stop().await;
    Ok(())
}
