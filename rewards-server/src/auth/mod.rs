//! Authentication middleware, authorization checks and rate limiting

pub mod access;
pub mod rate_limit;
pub mod session;

pub use session::Identity;
