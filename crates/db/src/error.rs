//! Fehlertypen fuer das Datenbank-Crate

use thiserror::Error;

/// Result-Alias fuer Repository-Operationen
pub type DbResult<T> = Result<T, DbError>;

/// Datenbank-Fehlertypen
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Datensatz nicht gefunden: {0}")]
    NichtGefunden(String),

    /// Eindeutigkeitsverletzung auf der E-Mail-Adresse (z.B. paralleles Anlegen)
    #[error("E-Mail bereits vergeben: {0}")]
    EmailVergeben(String),

    #[error("Ungueltige Daten: {0}")]
    UngueltigeDaten(String),

    #[error("SQLx-Fehler: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Migration-Fehler: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("JSON-Fehler: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Interner DB-Fehler: {0}")]
    Intern(String),
}

impl DbError {
    pub fn nicht_gefunden(msg: impl Into<String>) -> Self {
        Self::NichtGefunden(msg.into())
    }

    pub fn ungueltige_daten(msg: impl Into<String>) -> Self {
        Self::UngueltigeDaten(msg.into())
    }

    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }

    /// Gibt true zurueck wenn es sich um einen Eindeutigkeitsfehler handelt
    pub fn ist_eindeutigkeit(&self) -> bool {
        matches!(self, Self::EmailVergeben(_))
            || matches!(self, Self::Sqlx(e) if {
                let msg = e.to_string();
                msg.contains("UNIQUE") || msg.contains("unique")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eindeutigkeit_erkennung() {
        assert!(DbError::EmailVergeben("a@x.com".into()).ist_eindeutigkeit());
        assert!(!DbError::nicht_gefunden("x").ist_eindeutigkeit());
        assert!(!DbError::ungueltige_daten("x").ist_eindeutigkeit());
    }
}
