//! Fehlertypen fuer gatekeep
//!
//! Prozessweite Fehler, die nicht zu einer einzelnen Anfrage gehoeren
//! (Konfiguration, Start). Anfragebezogene Fehler definieren die
//! jeweiligen Crates selbst.

use thiserror::Error;

/// Globaler Result-Alias fuer gatekeep
pub type Result<T> = std::result::Result<T, GatekeepError>;

/// Prozessweite Fehler
#[derive(Debug, Error)]
pub enum GatekeepError {
    // --- Konfiguration ---
    #[error("Konfigurationsfehler: {0}")]
    Konfiguration(String),

    // --- Werte ---
    #[error("Unbekannter Provider: {0}")]
    UnbekannterProvider(String),

    #[error("Unbekannte Rolle: {0}")]
    UnbekannteRolle(String),

    // --- Intern ---
    #[error("Interner Fehler: {0}")]
    Intern(String),
}

impl GatekeepError {
    /// Erstellt einen Konfigurationsfehler aus einer beliebigen Nachricht
    pub fn konfiguration(msg: impl Into<String>) -> Self {
        Self::Konfiguration(msg.into())
    }

    /// Erstellt einen internen Fehler aus einer beliebigen Nachricht
    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }

    /// Gibt true zurueck wenn der Fehler den Prozessstart verhindern muss
    pub fn ist_fatal(&self) -> bool {
        matches!(self, Self::Konfiguration(_))
    }
}
