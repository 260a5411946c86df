//! Database Module
//!
//! Connection pooling for PostgreSQL.

pub mod connection;

pub use connection::{create_pool, DatabaseConfig, DatabasePool};
