//! Data models
//!
//! Shared between rewards-server and API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`;
//! discriminators map onto Postgres enum types.
//! All IDs are `i64` snowflakes, all timestamps are Unix milliseconds.

pub mod balance;
pub mod campaign;
pub mod portal;
pub mod reconciliation;
pub mod restaurant;
pub mod user;
pub mod voucher;

// Re-exports
pub use balance::*;
pub use campaign::*;
pub use portal::*;
pub use reconciliation::*;
pub use restaurant::*;
pub use user::*;
pub use voucher::*;
