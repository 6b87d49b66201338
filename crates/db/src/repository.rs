//! Repository-Trait fuer Identitaeten
//!
//! Das Repository-Pattern entkoppelt die Authentifizierungslogik von der
//! konkreten Datenbank-Implementierung.

use gatekeep_core::IdentitaetId;

use crate::error::DbResult;
use crate::models::{IdentitaetRecord, IdentitaetUpdate, NeueIdentitaet};

/// Konfiguration fuer die Datenbankverbindung
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Verbindungs-URL (z.B. "sqlite://gatekeep.db")
    pub url: String,
    /// Maximale Anzahl gleichzeitiger Verbindungen im Pool
    pub max_verbindungen: u32,
    /// Ob WAL-Modus bei SQLite aktiviert werden soll
    pub sqlite_wal: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://gatekeep.db".into(),
            max_verbindungen: 5,
            sqlite_wal: true,
        }
    }
}

/// Repository fuer Identitaets-Datenzugriffe
///
/// `create` muss die Eindeutigkeit der E-Mail atomar durchsetzen und bei
/// einer Verletzung [`DbError::EmailVergeben`](crate::DbError::EmailVergeben)
/// liefern. `update` liefert `NichtGefunden` fuer unbekannte IDs.
#[allow(async_fn_in_trait)]
pub trait IdentitaetRepository: Send + Sync {
    /// Eine Identitaet anhand ihrer E-Mail laden
    async fn get_by_email(&self, email: &str) -> DbResult<Option<IdentitaetRecord>>;

    /// Eine Identitaet anhand ihrer ID laden
    async fn get_by_id(&self, id: IdentitaetId) -> DbResult<Option<IdentitaetRecord>>;

    /// Eine neue Identitaet anlegen
    async fn create(&self, data: NeueIdentitaet<'_>) -> DbResult<IdentitaetRecord>;

    /// Eine Identitaet teilweise aktualisieren
    async fn update(&self, id: IdentitaetId, data: IdentitaetUpdate)
        -> DbResult<IdentitaetRecord>;
}
