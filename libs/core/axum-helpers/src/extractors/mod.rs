//! Extractors that deserialize and then run `validator` rules.
//!
//! Both reject with [`AppError`](crate::AppError), so failures use the
//! standard error envelope.

pub mod validated_json;
pub mod validated_query;

pub use validated_json::ValidatedJson;
pub use validated_query::ValidatedQuery;
