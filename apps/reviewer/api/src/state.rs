//! Shared application state.

use domain_reviews::PgUnitOfWork;
use std::sync::Arc;

/// Cloned into the readiness handler; the domain routers hold their own
/// `Arc` of the unit of work.
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    /// PostgreSQL connection pool
    pub db: database::postgres::DatabaseConnection,
    pub uow: Arc<PgUnitOfWork>,
}
