//! Repository implementations.
//!
//! - `local`: in-memory implementation for tests and local development
//! - `postgres`: Diesel implementation, behind the `postgres-repo` feature
pub mod local;
#[cfg(feature = "postgres-repo")]
pub mod postgres;

pub use local::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use postgres::{PostgresConfig, PostgresRepository};
