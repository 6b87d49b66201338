//! Gemeinsame Identitaetstypen fuer gatekeep
//!
//! IDs verwenden das Newtype-Pattern, Provider und Rollen sind geschlossene
//! Enums. Es gibt keine untypisierten Benutzer- oder Profilobjekte.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GatekeepError;

/// Eindeutige Identitaets-ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentitaetId(pub Uuid);

impl IdentitaetId {
    /// Erstellt eine neue zufaellige IdentitaetId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Gibt die innere UUID zurueck
    pub fn inner(&self) -> Uuid {
        self.0
    }
}

impl Default for IdentitaetId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for IdentitaetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for IdentitaetId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Login-Provider eines Kontos
///
/// Ein Konto hat genau einen Provider, der nach dem Anlegen nicht mehr
/// geaendert wird.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// E-Mail + Passwort, von gatekeep selbst verwaltet
    Local,
    Google,
    Facebook,
}

impl Provider {
    pub fn als_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Google => "google",
            Self::Facebook => "facebook",
        }
    }

    /// Gibt `true` zurueck fuer externe OAuth-Provider
    pub fn ist_oauth(&self) -> bool {
        !matches!(self, Self::Local)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.als_str())
    }
}

impl FromStr for Provider {
    type Err = GatekeepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(Self::Local),
            "google" => Ok(Self::Google),
            "facebook" => Ok(Self::Facebook),
            other => Err(GatekeepError::UnbekannterProvider(other.to_string())),
        }
    }
}

/// Rolle einer Identitaet
///
/// Die Reihenfolge der Varianten ist die Rangfolge (`User` < `Admin` < `SuperAdmin`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rolle {
    User,
    Admin,
    SuperAdmin,
}

impl Rolle {
    pub fn als_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::SuperAdmin => "super_admin",
        }
    }

    /// Hoechste Rolle aus einer Menge, `User` wenn leer
    pub fn hoechste(rollen: &[Rolle]) -> Rolle {
        rollen.iter().copied().max().unwrap_or_default()
    }
}

impl Default for Rolle {
    fn default() -> Self {
        Self::User
    }
}

impl fmt::Display for Rolle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.als_str())
    }
}

impl FromStr for Rolle {
    type Err = GatekeepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            "super_admin" => Ok(Self::SuperAdmin),
            other => Err(GatekeepError::UnbekannteRolle(other.to_string())),
        }
    }
}
