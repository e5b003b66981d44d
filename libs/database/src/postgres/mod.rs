//! PostgreSQL connector, pool configuration and health probe.

mod config;
mod connector;
mod health;

pub use config::{PostgresConfig, parse_isolation_level};
pub use connector::{connect_from_config, connect_from_config_with_retry, run_migrations};
pub use health::check_health;

pub use sea_orm::{ConnectOptions, DatabaseConnection, DbErr, IsolationLevel};
pub use sea_orm_migration::MigratorTrait;
