//! Datenmodelle fuer den Credential-Store
//!
//! Diese Typen repraesentieren Identitaets-Datensaetze. Der Provider eines
//! Kontos ist nach dem Anlegen unveraenderlich: [`IdentitaetUpdate`] hat
//! deshalb kein Provider-Feld.

use chrono::{DateTime, Utc};
use gatekeep_core::{IdentitaetId, Provider, Rolle};
use serde::{Deserialize, Serialize};

use crate::error::{DbError, DbResult};

/// Optionale Profildaten einer Identitaet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profil {
    pub anzeigename: Option<String>,
    pub bild_url: Option<String>,
}

/// Identitaets-Datensatz
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentitaetRecord {
    pub id: IdentitaetId,
    pub email: String,
    /// PHC-String, nur bei `provider == Local` vorhanden
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub provider: Provider,
    pub email_verified: bool,
    pub rollen: Vec<Rolle>,
    pub profil: Profil,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl IdentitaetRecord {
    /// Hoechste Rolle der Identitaet (fuer Token-Claims)
    pub fn rolle(&self) -> Rolle {
        Rolle::hoechste(&self.rollen)
    }
}

/// Daten zum Anlegen einer neuen Identitaet
#[derive(Debug, Clone)]
pub struct NeueIdentitaet<'a> {
    pub email: &'a str,
    pub password_hash: Option<&'a str>,
    pub provider: Provider,
    pub email_verified: bool,
    pub rollen: Vec<Rolle>,
    pub profil: Profil,
}

impl<'a> NeueIdentitaet<'a> {
    /// Lokales Konto (E-Mail + Passwort), noch nicht verifiziert
    pub fn lokal(email: &'a str, password_hash: &'a str) -> Self {
        Self {
            email,
            password_hash: Some(password_hash),
            provider: Provider::Local,
            email_verified: false,
            rollen: vec![Rolle::User],
            profil: Profil::default(),
        }
    }

    /// OAuth-Konto ohne Passwort; die E-Mail gilt als vom Provider verifiziert
    pub fn oauth(email: &'a str, provider: Provider, profil: Profil) -> Self {
        Self {
            email,
            password_hash: None,
            provider,
            email_verified: true,
            rollen: vec![Rolle::User],
            profil,
        }
    }

    /// Prueft die Invarianten vor dem Schreiben
    ///
    /// Ein Passwort-Hash ist genau dann vorhanden, wenn der Provider `Local` ist.
    pub fn pruefen(&self) -> DbResult<()> {
        if self.email.trim().is_empty() {
            return Err(DbError::ungueltige_daten("E-Mail darf nicht leer sein"));
        }
        match (self.provider, self.password_hash) {
            (Provider::Local, None) => Err(DbError::ungueltige_daten(
                "Lokales Konto ohne Passwort-Hash",
            )),
            (p, Some(_)) if p.ist_oauth() => Err(DbError::ungueltige_daten(format!(
                "{p}-Konto darf keinen Passwort-Hash haben"
            ))),
            _ => Ok(()),
        }
    }
}

/// Daten zum Aktualisieren einer Identitaet (nur gesetzte Felder werden geaendert)
#[derive(Debug, Clone, Default)]
pub struct IdentitaetUpdate {
    pub password_hash: Option<String>,
    pub email_verified: Option<bool>,
    pub rollen: Option<Vec<Rolle>>,
    pub anzeigename: Option<Option<String>>,
    pub bild_url: Option<Option<String>>,
}

impl IdentitaetUpdate {
    pub fn ist_leer(&self) -> bool {
        self.password_hash.is_none()
            && self.email_verified.is_none()
            && self.rollen.is_none()
            && self.anzeigename.is_none()
            && self.bild_url.is_none()
    }
}
