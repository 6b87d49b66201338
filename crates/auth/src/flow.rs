//! Gemeinsame Bausteine der Token-Flows (Passwort-Reset, E-Mail-Verifikation)
//!
//! Zustandsmaschine: `Angefordert -> Ausstehend -> Eingeloest` oder
//! `Ausstehend -> Abgelaufen`. Aus `Abgelaufen` oder `Eingeloest` fuehrt nur
//! eine neue Anforderung zurueck. Tokens werden nicht als verbraucht
//! markiert; bis zum Ablauf kann ein Token erneut eingeloest werden.

use serde::{Deserialize, Serialize};

use crate::error::AuthResult;
use crate::token::{TokenCodec, TokenFehler, TokenZweck, VerifizierteClaims};

/// Zustand eines Flow-Tokens aus Sicht des Aufrufers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowZustand {
    Ausstehend,
    Eingeloest,
    Abgelaufen,
}

/// Claims der Flow-Tokens: nur die E-Mail, keine Rollen oder Session-Daten
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailClaims {
    pub email: String,
}

/// Verifiziert ein Flow-Token; `Ok(None)` bedeutet abgelaufen
pub(crate) fn flow_token_lesen(
    codec: &TokenCodec,
    token: &str,
    zweck: TokenZweck,
) -> AuthResult<Option<VerifizierteClaims<EmailClaims>>> {
    match codec.verifizieren::<EmailClaims>(token, zweck) {
        Ok(claims) => Ok(Some(claims)),
        Err(TokenFehler::Abgelaufen) => Ok(None),
        Err(grund) => Err(grund.into()),
    }
}
