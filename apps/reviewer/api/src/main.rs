use axum_helpers::server::{create_production_app, create_router, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use database::common::RetryConfig;
use database::postgres::{connect_from_config_with_retry, run_migrations};
use domain_reviews::PgUnitOfWork;
use std::sync::Arc;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    let config = Config::from_env()?;

    init_tracing(&config.environment);

    let db = connect_from_config_with_retry(&config.database, Some(RetryConfig::new()))
        .await
        .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;

    if config.run_migrations {
        run_migrations::<migration::Migrator>(&db, config.app.name)
            .await
            .map_err(|e| eyre::eyre!("Migrations failed: {}", e))?;
    }

    let uow = Arc::new(PgUnitOfWork::with_isolation_level(
        db.clone(),
        config.database.isolation_level,
    ));

    let state = AppState {
        config,
        db,
        uow,
    };

    let router = create_router::<openapi::ApiDoc>(api::routes(&state))?;

    // - /health: liveness with app name/version
    // - /ready: database ping
    let app = router
        .merge(health_router(state.config.app))
        .merge(api::ready_router(state.clone()));

    let shutdown_timeout = state.config.server.shutdown_timeout;
    info!(?shutdown_timeout, "Starting reviewer API");

    let db = state.db.clone();
    create_production_app(app, &state.config.server, shutdown_timeout, async move {
        info!("Shutting down: closing database connections");
        match db.close().await {
            Ok(()) => info!("PostgreSQL connection closed successfully"),
            Err(e) => tracing::error!("Error closing PostgreSQL: {}", e),
        }
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Reviewer API shutdown complete");
    Ok(())
}
