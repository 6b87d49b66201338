//! HTTP-Fehler des REST-Adapters
//!
//! Login-Fehler werden nach aussen nicht unterschieden (keine
//! Konto-Enumeration); ein Provider-Konflikt nennt den gespeicherten
//! Provider; Token-Fehler bei Links erscheinen alle gleich.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use gatekeep_auth::AuthError;
use gatekeep_core::Provider;
use serde_json::json;
use thiserror::Error;

/// Fehler, wie sie der Client sieht
#[derive(Debug, Error)]
pub enum RestError {
    #[error("Ungueltige Anmeldedaten")]
    Anmeldung,

    #[error("Nicht angemeldet")]
    NichtAngemeldet,

    #[error("Konto existiert bereits mit {0}. Bitte mit {0} anmelden.")]
    ProviderKonflikt(Provider),

    #[error("E-Mail bereits registriert")]
    EmailVergeben,

    #[error("Link ungueltig oder abgelaufen")]
    LinkUngueltig,

    #[error("{0}")]
    Validierung(String),

    #[error("Zugriff verweigert")]
    Verboten,

    #[error("Interner Serverfehler")]
    Intern,
}

impl RestError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Anmeldung | Self::NichtAngemeldet => StatusCode::UNAUTHORIZED,
            Self::ProviderKonflikt(_) | Self::EmailVergeben => StatusCode::CONFLICT,
            Self::LinkUngueltig | Self::Validierung(_) => StatusCode::BAD_REQUEST,
            Self::Verboten => StatusCode::FORBIDDEN,
            Self::Intern => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Fehler beim Einloesen eines Links: alles, was auf ein unbrauchbares
    /// Token oder ein verschwundenes Konto hinweist, wird `LinkUngueltig`
    pub fn fuer_link(e: AuthError) -> Self {
        match e {
            AuthError::TokenUngueltig(grund) => {
                tracing::debug!(grund = %grund, "Link-Token abgelehnt");
                Self::LinkUngueltig
            }
            AuthError::NichtGefunden(_) | AuthError::FalscherProvider { .. } => {
                tracing::debug!(fehler = %e, "Link-Token passt zu keinem Konto");
                Self::LinkUngueltig
            }
            andere => andere.into(),
        }
    }
}

impl From<AuthError> for RestError {
    fn from(e: AuthError) -> Self {
        match e {
            e if e.ist_anmeldefehler() => {
                tracing::debug!(fehler = %e, "Anmeldung abgelehnt");
                Self::Anmeldung
            }
            AuthError::ProviderKonflikt { vorhanden } => Self::ProviderKonflikt(vorhanden),
            AuthError::EmailVergeben(_) => Self::EmailVergeben,
            AuthError::TokenUngueltig(grund) => {
                tracing::debug!(grund = %grund, "Token abgelehnt");
                Self::LinkUngueltig
            }
            AuthError::ZugriffVerweigert(rolle) => {
                tracing::debug!(rolle = %rolle, "Zugriff verweigert");
                Self::Verboten
            }
            AuthError::EmailFehlt
            | AuthError::EmailUngueltig(_)
            | AuthError::PasswortUngueltig(_)
            | AuthError::ProfilUngueltig(_) => Self::Validierung(e.to_string()),
            andere => {
                tracing::error!(fehler = %andere, "Interner Fehler bei Anfrage");
                Self::Intern
            }
        }
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.status();
        fehler_antwort(status, &self.to_string())
    }
}

/// Baut eine Fehlerantwort im einheitlichen Format
pub fn fehler_antwort(status: StatusCode, nachricht: &str) -> Response {
    (
        status,
        Json(json!({ "error": { "code": status.as_u16(), "message": nachricht } })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use gatekeep_auth::TokenFehler;
    use gatekeep_core::Rolle;

    use super::*;

    #[test]
    fn login_fehler_sind_gleich() {
        let fehler = [
            AuthError::NichtGefunden("a@x.com".into()),
            AuthError::FalschesPasswort,
            AuthError::FalscherProvider {
                provider: Provider::Google,
            },
        ];
        for e in fehler {
            let r: RestError = e.into();
            assert_eq!(r.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(r.to_string(), "Ungueltige Anmeldedaten");
        }
    }

    #[test]
    fn provider_konflikt_nennt_provider() {
        let r: RestError = AuthError::ProviderKonflikt {
            vorhanden: Provider::Google,
        }
        .into();
        assert_eq!(r.status(), StatusCode::CONFLICT);
        assert!(r.to_string().contains("google"));
    }

    #[test]
    fn link_fehler_sind_gleich() {
        for e in [
            AuthError::TokenUngueltig(TokenFehler::Abgelaufen),
            AuthError::TokenUngueltig(TokenFehler::SignaturUngueltig),
            AuthError::NichtGefunden("a@x.com".into()),
        ] {
            let r = RestError::fuer_link(e);
            assert_eq!(r.status(), StatusCode::BAD_REQUEST);
            assert_eq!(r.to_string(), "Link ungueltig oder abgelaufen");
        }
    }

    #[test]
    fn weitere_zuordnungen() {
        let r: RestError = AuthError::ZugriffVerweigert(Rolle::User).into();
        assert_eq!(r.status(), StatusCode::FORBIDDEN);
        let r: RestError = AuthError::PasswortUngueltig("zu kurz".into()).into();
        assert_eq!(r.status(), StatusCode::BAD_REQUEST);
        let r: RestError = AuthError::intern("kaputt").into();
        assert_eq!(r.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(r.to_string(), "Interner Serverfehler");
    }
}
