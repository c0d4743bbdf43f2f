pub mod config;
pub mod error;
pub mod health;
pub mod lists;
pub mod logging;
pub mod metrics;
pub mod model;
pub mod pages;
pub mod server;
pub mod shutdown;
pub mod state;
pub mod store;

pub use config::{CliArgs, ServerConfig};
pub use error::AppError;
pub use logging::{LogFormat, LogOutput, LoggingConfig, init_logging};
pub use server::build_router;

use anyhow::Result;
use state::AppState;
use std::sync::Arc;
use store::{Store, StoreStats};

pub async fn run_server(config: ServerConfig) -> Result<()> {
    let config = Arc::new(config);
    config.ensure_database_dir()?;

    let store = Store::open(&config.database_path)?;
    let state = Arc::new(AppState::new(config.clone(), store)?);

    tracing::info!(
        database = %config.database_path.display(),
        bind = %config.http_bind_address,
        "starting superlists server",
    );

    match startup_scan(&state) {
        Ok(stats) => {
            metrics::METRICS.update_store_counts(stats.lists, stats.items);
            if stats.lists == 0 {
                tracing::info!("startup scan complete: store is empty");
            } else {
                tracing::info!(
                    lists = stats.lists,
                    items = stats.items,
                    "startup scan found existing lists"
                );
            }
        }
        Err(error) => {
            tracing::warn!(?error, "startup scan failed");
        }
    }

    server::serve(config, state).await
}

pub fn startup_scan(state: &Arc<AppState>) -> rusqlite::Result<StoreStats> {
    state.store().stats()
}
