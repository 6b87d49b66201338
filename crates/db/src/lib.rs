//! gatekeep-db – Credential-Store
//!
//! Dieses Crate stellt das Repository-Pattern fuer Identitaeten bereit.
//! Die Geschaeftslogik in `gatekeep-auth` kennt nur den Trait
//! [`IdentitaetRepository`]; konkrete Backends sind der In-Memory-Store
//! (Tests, Entwicklung) und SQLite.

pub mod error;
pub mod memory;
pub mod models;
pub mod repository;
pub mod sqlite;

pub use error::{DbError, DbResult};
pub use memory::InMemoryIdentitaeten;
pub use models::{IdentitaetRecord, IdentitaetUpdate, NeueIdentitaet, Profil};
pub use repository::{DatabaseConfig, IdentitaetRepository};
pub use sqlite::SqliteDb;
