//! Reviews Domain
//!
//! Teams, users and pull requests with automatic reviewer assignment.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │   Handlers   │  ← HTTP endpoints
//! └──────┬───────┘
//!        │
//! ┌──────▼───────┐
//! │   Services   │  ← Team / User / PullRequest use cases
//! └──────┬───────┘
//!        │  transact(uow, |tx| ...)
//! ┌──────▼───────┐
//! │ Unit of work │  ← one scope = one transaction, exposes all repositories
//! └──────┬───────┘
//!        │
//! ┌──────▼───────┐
//! │    Stores    │  ← InMemoryStore, PgUnitOfWork
//! └──────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use domain_reviews::{handlers, InMemoryStore};
//!
//! let router = handlers::router(Arc::new(InMemoryStore::new()));
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

#[cfg(test)]
mod test_support;

pub use error::{ReviewError, ReviewResult};
pub use handlers::ApiDoc;
pub use memory::InMemoryStore;
pub use models::{
    PullRequest, PullRequestDetails, PullRequestReviewer, PullRequestStatus, Team, TeamDetails,
    TeamMember, User, UserReviews,
};
pub use postgres::PgUnitOfWork;
pub use repository::{
    PullRequestRepository, TeamRepository, TransactionScope, UnitOfWork, UserRepository,
    transact,
};
pub use service::{PullRequestService, TeamService, UserService};
