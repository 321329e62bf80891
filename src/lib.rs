pub mod api;
pub mod config;
pub mod db;
pub mod entities;
pub mod models;
pub mod services;

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use api::AppState;
pub use config::Config;
use db::Store;

pub async fn run() -> anyhow::Result<()> {
    // .env is optional; real deployments set the variables directly
    dotenvy::dotenv().ok();

    let config = Config::load()?;
    config.validate()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let store = Store::with_pool_options(
        &config.database.url,
        config.database.max_connections,
        config.database.min_connections,
    )
    .await?;

    let state = AppState::new(Arc::new(config.clone()), store);
    state.uploads.ensure_dir().await?;

    let app = api::build_router(state);
    let addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Server running at http://{addr}");

    tokio::select! {
        result = axum::serve(listener, app) => {
            if let Err(e) = result {
                error!("Server error: {e}");
            }
        }
        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => info!("Shutdown signal received"),
                Err(e) => error!("Error listening for shutdown: {e}"),
            }
        }
    }

    Ok(())
}
