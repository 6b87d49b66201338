//! SQLite-Backend fuer den Credential-Store

pub mod identitaeten;
pub mod pool;

pub use pool::SqliteDb;
