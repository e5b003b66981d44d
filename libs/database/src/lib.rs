//! Connection management for the reviewer service's PostgreSQL store.
//!
//! # Features
//!
//! - `postgres` (default) - PostgreSQL support with SeaORM
//! - `config` (default) - `core_config::FromEnv` for [`postgres::PostgresConfig`]
//!
//! # Example
//!
//! ```ignore
//! use core_config::FromEnv;
//! use database::common::RetryConfig;
//! use database::postgres::{PostgresConfig, connect_from_config_with_retry, run_migrations};
//!
//! let config = PostgresConfig::from_env()?;
//! let db = connect_from_config_with_retry(config, Some(RetryConfig::new().with_max_retries(5))).await?;
//! run_migrations::<migration::Migrator>(&db, "reviewer_api").await?;
//! ```

pub mod common;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use common::{DatabaseError, DatabaseResult};
