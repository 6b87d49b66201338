//! Sessions als signierte Zugangs-Tokens
//!
//! Eine Session ist zustandslos: das Zugangs-Token traegt Identitaets-ID,
//! E-Mail, hoechste Rolle und Provider. Wie das Token transportiert wird
//! (Cookie, Bearer-Header), entscheidet die aeussere Schicht anhand von
//! [`ZugangsToken::max_age_sekunden`].

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use gatekeep_core::{IdentitaetId, Provider, Rolle};
use gatekeep_db::IdentitaetRecord;
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};
use crate::token::{TokenCodec, TokenZweck};

/// Claims eines Zugangs-Tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZugangsClaims {
    pub sub: IdentitaetId,
    pub email: String,
    pub role: Rolle,
    pub provider: Provider,
}

impl ZugangsClaims {
    pub fn fuer(identitaet: &IdentitaetRecord) -> Self {
        Self {
            sub: identitaet.id,
            email: identitaet.email.clone(),
            role: identitaet.rolle(),
            provider: identitaet.provider,
        }
    }
}

/// Ausgestelltes Zugangs-Token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZugangsToken {
    pub token: String,
    pub laeuft_ab_am: DateTime<Utc>,
    /// Restlaufzeit bei Ausstellung
    pub max_age_sekunden: i64,
}

/// Authentifizierter Aufrufer (aus einem gueltigen Zugangs-Token)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub id: IdentitaetId,
    pub email: String,
    pub rolle: Rolle,
    pub provider: Provider,
    pub laeuft_ab_am: DateTime<Utc>,
}

/// Stellt Zugangs-Tokens aus und prueft sie
#[derive(Debug, Clone)]
pub struct SessionAussteller {
    codec: Arc<TokenCodec>,
    ttl: Duration,
}

impl SessionAussteller {
    pub fn neu(codec: Arc<TokenCodec>, ttl: Duration) -> Self {
        Self { codec, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Stellt ein Zugangs-Token fuer eine Identitaet aus
    pub fn session_ausstellen(&self, identitaet: &IdentitaetRecord) -> AuthResult<ZugangsToken> {
        let signiert = self.codec.signieren(
            &ZugangsClaims::fuer(identitaet),
            TokenZweck::Zugang,
            self.ttl,
        )?;

        tracing::debug!(
            user_id = %identitaet.id,
            laeuft_ab_am = %signiert.laeuft_ab_am,
            "Zugangs-Token ausgestellt"
        );

        Ok(ZugangsToken {
            max_age_sekunden: (signiert.laeuft_ab_am - signiert.ausgestellt_am).num_seconds(),
            token: signiert.token,
            laeuft_ab_am: signiert.laeuft_ab_am,
        })
    }

    /// Prueft ein Zugangs-Token und liefert den Aufrufer
    pub fn session_pruefen(&self, token: &str) -> AuthResult<Principal> {
        let geprueft = self
            .codec
            .verifizieren::<ZugangsClaims>(token, TokenZweck::Zugang)
            .map_err(|grund| {
                tracing::debug!(grund = %grund, "Zugangs-Token abgelehnt");
                AuthError::TokenUngueltig(grund)
            })?;

        let claims = geprueft.claims;
        Ok(Principal {
            id: claims.sub,
            email: claims.email,
            rolle: claims.role,
            provider: claims.provider,
            laeuft_ab_am: geprueft.laeuft_ab_am,
        })
    }
}

/// Verlangt, dass die Rolle des Principals in `erlaubt` enthalten ist
///
/// Keine Vererbung: wer Admins und Nutzer zulassen will, nennt beide.
pub fn rolle_erfordern(principal: &Principal, erlaubt: &[Rolle]) -> AuthResult<()> {
    if erlaubt.contains(&principal.rolle) {
        Ok(())
    } else {
        Err(AuthError::ZugriffVerweigert(principal.rolle))
    }
}
