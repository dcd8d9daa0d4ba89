//! Database module
//!
//! SQLite connection pool and migrations for the score cache.

pub mod connection;
pub mod migrations;

pub use connection::{Database, DbError, DbResult};
