//! # ncemacros-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the `ResourceStore` port defined in `ncemacros-app::ports`
//! - Manage the `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows, including the host system
//!   names stored next to each row
//!
//! ## Dependency rule
//! Depends on `ncemacros-app` (for the port trait) and `ncemacros-domain`
//! (for domain types). The `app` and `domain` crates must never reference
//! this adapter.

pub mod error;
pub mod pool;
pub mod resource_store;
pub mod system_name;

pub use error::StorageError;
pub use pool::{Config, Database};
pub use resource_store::SqliteResourceStore;
