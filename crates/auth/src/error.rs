//! Fehlertypen fuer den Auth-Kern
//!
//! Der Kern unterscheidet alle Fehlerfaelle; welche davon nach aussen
//! zusammengefasst werden (z.B. "Ungueltige Anmeldedaten"), entscheidet die
//! Transportschicht.

use gatekeep_core::{Provider, Rolle};
use gatekeep_db::DbError;
use thiserror::Error;

use crate::token::TokenFehler;

/// Alle moeglichen Fehler im Auth-Kern
#[derive(Debug, Error)]
pub enum AuthError {
    // --- Passwort ---
    #[error("Passwort-Hashing fehlgeschlagen: {0}")]
    PasswortHashing(String),

    #[error("Passwort entspricht nicht den Anforderungen: {0}")]
    PasswortUngueltig(String),

    // --- Identitaet ---
    #[error("Keine Identitaet gefunden: {0}")]
    NichtGefunden(String),

    #[error("Operation fuer {provider}-Konten nicht moeglich")]
    FalscherProvider { provider: Provider },

    #[error("Konto existiert bereits mit {vorhanden}. Bitte mit {vorhanden} anmelden.")]
    ProviderKonflikt { vorhanden: Provider },

    #[error("E-Mail bereits vergeben: {0}")]
    EmailVergeben(String),

    #[error("Ungueltige E-Mail-Adresse: '{0}'")]
    EmailUngueltig(String),

    // --- Authentifizierung ---
    #[error("Passwort falsch")]
    FalschesPasswort,

    #[error("Token ungueltig oder abgelaufen")]
    TokenUngueltig(TokenFehler),

    #[error("Zugriff verweigert: Rolle '{0}' reicht nicht aus")]
    ZugriffVerweigert(Rolle),

    // --- OAuth ---
    #[error("OAuth-Profil enthaelt keine E-Mail")]
    EmailFehlt,

    #[error("OAuth-Profil ungueltig: {0}")]
    ProfilUngueltig(String),

    // --- Konfiguration ---
    #[error("Konfigurationsfehler: {0}")]
    Konfiguration(String),

    // --- Datenbank ---
    #[error("Datenbankfehler: {0}")]
    Datenbank(DbError),

    // --- Intern ---
    #[error("Interner Fehler: {0}")]
    Intern(String),
}

impl AuthError {
    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }

    pub fn konfiguration(msg: impl Into<String>) -> Self {
        Self::Konfiguration(msg.into())
    }

    /// Fehler eines Login-Versuchs, die nach aussen nicht unterschieden werden
    pub fn ist_anmeldefehler(&self) -> bool {
        matches!(
            self,
            Self::NichtGefunden(_) | Self::FalscherProvider { .. } | Self::FalschesPasswort
        )
    }

    /// Konkreter Grund eines Token-Fehlers (fuer Logs)
    pub fn token_grund(&self) -> Option<TokenFehler> {
        match self {
            Self::TokenUngueltig(grund) => Some(*grund),
            _ => None,
        }
    }
}

impl From<TokenFehler> for AuthError {
    fn from(grund: TokenFehler) -> Self {
        Self::TokenUngueltig(grund)
    }
}

impl From<DbError> for AuthError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::EmailVergeben(email) => Self::EmailVergeben(email),
            DbError::NichtGefunden(was) => Self::NichtGefunden(was),
            andere => Self::Datenbank(andere),
        }
    }
}

/// Result-Alias fuer den Auth-Kern
pub type AuthResult<T> = Result<T, AuthError>;
