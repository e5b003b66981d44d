//! # Axum Helpers
//!
//! Shared HTTP plumbing for the reviewer service.
//!
//! - **[`server`]**: router assembly, health endpoints, graceful shutdown
//! - **[`errors`]**: the `{"error":{"code","message"}}` envelope and [`AppError`]
//! - **[`extractors`]**: JSON and query extractors that run `validator` rules
//!
//! ```ignore
//! use axum_helpers::server::{create_production_app, create_router, health_router};
//! use core_config::{app_info, server::ServerConfig};
//!
//! let router = create_router::<ApiDoc>(api_routes)?.merge(health_router(app_info!()));
//! let config = ServerConfig::default();
//! create_production_app(router, &config, config.shutdown_timeout, async {}).await?;
//! ```

pub mod errors;
pub mod extractors;
pub mod server;

pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_production_app, create_router,
    health_router, run_health_checks, shutdown_signal,
};

pub use errors::{AppError, ErrorBody, ErrorCode, ErrorResponse};

pub use extractors::{ValidatedJson, ValidatedQuery};
