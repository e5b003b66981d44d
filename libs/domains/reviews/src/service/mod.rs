//! Use cases. Each public operation runs in exactly one unit of work.

mod pull_request;
mod team;
mod user;

pub use pull_request::PullRequestService;
pub use team::TeamService;
pub use user::UserService;
