//! Sea-ORM entities, one module per table.

pub mod pull_request_reviewers;
pub mod pull_requests;
pub mod teams;
pub mod users;
