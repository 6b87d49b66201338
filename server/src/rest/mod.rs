//! REST-Adapter fuer den Auth-Kern
//!
//! Duenne Schicht: Anfragen werden in Aufrufe des [`AuthService`]
//! uebersetzt, Fehler in HTTP-Status und die Fehlerform
//! `{ "error": { "code", "message" } }`.

pub mod cookie;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod zustellung;

use std::sync::Arc;

use axum::http::HeaderMap;
use gatekeep_auth::{AuthService, Principal};
use gatekeep_db::SqliteDb;

use crate::rest::cookie::{token_extrahieren, CookieEinstellungen};
use crate::rest::error::RestError;
use crate::rest::zustellung::LinkZustellung;

/// Axum-State fuer den REST-Server
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService<SqliteDb>>,
    pub cookie: CookieEinstellungen,
    pub zustellung: Arc<dyn LinkZustellung>,
    /// Basis-URL fuer zugestellte Links (ohne abschliessenden `/`)
    pub oeffentliche_url: Arc<str>,
}

impl AppState {
    pub fn neu(
        auth: Arc<AuthService<SqliteDb>>,
        cookie: CookieEinstellungen,
        zustellung: Arc<dyn LinkZustellung>,
        oeffentliche_url: &str,
    ) -> Self {
        Self {
            auth,
            cookie,
            zustellung,
            oeffentliche_url: Arc::from(oeffentliche_url.trim_end_matches('/')),
        }
    }

    /// Authentifiziert die Anfrage ueber Bearer-Header oder Session-Cookie
    pub fn principal(&self, headers: &HeaderMap) -> Result<Principal, RestError> {
        let token =
            token_extrahieren(headers, &self.cookie.name).ok_or(RestError::NichtAngemeldet)?;
        self.auth.session_pruefen(&token).map_err(|e| {
            tracing::debug!(grund = ?e.token_grund(), "Session-Token abgelehnt");
            RestError::NichtAngemeldet
        })
    }
}
