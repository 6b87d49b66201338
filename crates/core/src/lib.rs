//! gatekeep-core – Gemeinsame Typen und Fehlertypen
//!
//! Dieses Crate stellt die geschlossenen Datentypen bereit, die von allen
//! anderen gatekeep-Crates gemeinsam genutzt werden: Identitaets-IDs,
//! Login-Provider und Rollen.

pub mod error;
pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use error::{GatekeepError, Result};
pub use types::{IdentitaetId, Provider, Rolle};
