//! Signierte, zweckgebundene Tokens (HS256)
//!
//! Jedes Token traegt neben den fachlichen Claims einen Zweck (`zweck`),
//! den Ausstellungszeitpunkt (`iat`) und den Ablaufzeitpunkt (`exp`).
//! Ein Token fuer einen Zweck wird fuer keinen anderen akzeptiert.
//!
//! Der Ablauf wird nicht von `jsonwebtoken` geprueft, sondern gegen die
//! injizierte [`Uhr`], ohne Toleranz: ein Token ist ab `exp` ungueltig.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use crate::error::{AuthError, AuthResult};

// ---------------------------------------------------------------------------
// Uhr
// ---------------------------------------------------------------------------

/// Zeitquelle fuer Ausstellung und Ablaufpruefung
pub trait Uhr: Send + Sync {
    fn jetzt(&self) -> DateTime<Utc>;
}

/// Systemuhr (Produktion)
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemUhr;

impl Uhr for SystemUhr {
    fn jetzt(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Stellbare Uhr fuer Tests
#[derive(Debug)]
pub struct FesteUhr {
    zeit: Mutex<DateTime<Utc>>,
}

impl FesteUhr {
    pub fn neu(zeit: DateTime<Utc>) -> Self {
        Self {
            zeit: Mutex::new(zeit),
        }
    }

    /// Stellt die Uhr um `dauer` vor
    pub fn vorstellen(&self, dauer: Duration) {
        let mut zeit = self.zeit.lock();
        *zeit += dauer;
    }

    pub fn setzen(&self, zeit: DateTime<Utc>) {
        *self.zeit.lock() = zeit;
    }
}

impl Uhr for FesteUhr {
    fn jetzt(&self) -> DateTime<Utc> {
        *self.zeit.lock()
    }
}

// ---------------------------------------------------------------------------
// Zweck und Fehler
// ---------------------------------------------------------------------------

/// Wofuer ein Token ausgestellt wurde
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenZweck {
    /// Session-Token
    Zugang,
    PasswortReset,
    EmailVerifikation,
}

/// Grund, warum ein Token abgelehnt wurde
///
/// Nur fuer Logs und Tests; nach aussen erscheinen alle Gruende gleich.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenFehler {
    #[error("Token fehlerhaft")]
    Fehlerhaft,
    #[error("Signatur ungueltig")]
    SignaturUngueltig,
    #[error("Token abgelaufen")]
    Abgelaufen,
    #[error("Token fuer anderen Zweck ausgestellt")]
    FalscherZweck,
}

// ---------------------------------------------------------------------------
// Codec
// ---------------------------------------------------------------------------

/// Nutzlast auf dem Draht: fachliche Claims plus Metadaten
#[derive(Serialize, Deserialize)]
struct Umschlag<C> {
    #[serde(flatten)]
    claims: C,
    zweck: TokenZweck,
    iat: i64,
    exp: i64,
}

/// Frisch signiertes Token mit Ablaufinformation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigniertesToken {
    pub token: String,
    pub ausgestellt_am: DateTime<Utc>,
    pub laeuft_ab_am: DateTime<Utc>,
}

/// Erfolgreich verifizierte Claims
#[derive(Debug, Clone, PartialEq)]
pub struct VerifizierteClaims<C> {
    pub claims: C,
    pub zweck: TokenZweck,
    pub ausgestellt_am: DateTime<Utc>,
    pub laeuft_ab_am: DateTime<Utc>,
}

/// Signiert und verifiziert Tokens mit einem gemeinsamen Geheimnis
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validierung: Validation,
    uhr: Arc<dyn Uhr>,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec").finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Erstellt einen Codec mit Systemuhr
    ///
    /// Ein leeres Geheimnis ist ein Konfigurationsfehler.
    pub fn neu(geheimnis: &[u8]) -> AuthResult<Self> {
        if geheimnis.is_empty() {
            return Err(AuthError::konfiguration(
                "Token-Geheimnis darf nicht leer sein",
            ));
        }

        let mut validierung = Validation::new(Algorithm::HS256);
        validierung.validate_exp = false;
        validierung.leeway = 0;
        validierung.set_required_spec_claims(&["exp"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(geheimnis),
            decoding: DecodingKey::from_secret(geheimnis),
            validierung,
            uhr: Arc::new(SystemUhr),
        })
    }

    /// Ersetzt die Zeitquelle
    pub fn mit_uhr(mut self, uhr: Arc<dyn Uhr>) -> Self {
        self.uhr = uhr;
        self
    }

    pub fn jetzt(&self) -> DateTime<Utc> {
        self.uhr.jetzt()
    }

    /// Signiert `claims` fuer `zweck` mit Laufzeit `ttl`
    pub fn signieren<C: Serialize>(
        &self,
        claims: &C,
        zweck: TokenZweck,
        ttl: Duration,
    ) -> AuthResult<SigniertesToken> {
        if ttl <= Duration::zero() {
            return Err(AuthError::konfiguration("Token-Laufzeit muss positiv sein"));
        }

        let jetzt = self.uhr.jetzt();
        let ablauf = jetzt
            .checked_add_signed(ttl)
            .ok_or_else(|| AuthError::konfiguration("Token-Laufzeit zu gross"))?;
        let umschlag = Umschlag {
            claims,
            zweck,
            iat: jetzt.timestamp(),
            exp: ablauf.timestamp(),
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &umschlag, &self.encoding)
            .map_err(|e| AuthError::intern(format!("Token-Signierung fehlgeschlagen: {e}")))?;

        Ok(SigniertesToken {
            token,
            ausgestellt_am: sekunden_zu_zeit(umschlag.iat),
            laeuft_ab_am: sekunden_zu_zeit(umschlag.exp),
        })
    }

    /// Prueft Signatur, Zweck und Ablauf und gibt die Claims zurueck
    pub fn verifizieren<C: DeserializeOwned>(
        &self,
        token: &str,
        zweck: TokenZweck,
    ) -> Result<VerifizierteClaims<C>, TokenFehler> {
        let daten =
            jsonwebtoken::decode::<Umschlag<C>>(token, &self.decoding, &self.validierung)
                .map_err(|e| match e.kind() {
                    ErrorKind::InvalidSignature => TokenFehler::SignaturUngueltig,
                    ErrorKind::ExpiredSignature => TokenFehler::Abgelaufen,
                    _ => TokenFehler::Fehlerhaft,
                })?;
        let umschlag = daten.claims;

        if umschlag.zweck != zweck {
            return Err(TokenFehler::FalscherZweck);
        }
        if self.uhr.jetzt().timestamp() >= umschlag.exp {
            return Err(TokenFehler::Abgelaufen);
        }

        Ok(VerifizierteClaims {
            claims: umschlag.claims,
            zweck: umschlag.zweck,
            ausgestellt_am: sekunden_zu_zeit(umschlag.iat),
            laeuft_ab_am: sekunden_zu_zeit(umschlag.exp),
        })
    }
}

fn sekunden_zu_zeit(sekunden: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(sekunden, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
