//! Session-Cookie und Token-Extraktion

use axum::http::{
    header::{AUTHORIZATION, COOKIE},
    HeaderMap, HeaderValue,
};

/// Cookie-Einstellungen aus der Konfiguration
#[derive(Debug, Clone)]
pub struct CookieEinstellungen {
    pub name: String,
    /// `Secure`-Attribut setzen (ausserhalb des Entwicklungsmodus)
    pub secure: bool,
}

impl CookieEinstellungen {
    /// `Set-Cookie` fuer ein Zugangs-Token
    pub fn session_cookie(&self, token: &str, max_age_sekunden: i64) -> Option<HeaderValue> {
        self.bauen(token, max_age_sekunden)
    }

    /// `Set-Cookie`, das die Session im Browser loescht
    pub fn cookie_loeschen(&self) -> Option<HeaderValue> {
        self.bauen("", 0)
    }

    fn bauen(&self, wert: &str, max_age: i64) -> Option<HeaderValue> {
        let mut cookie = format!(
            "{}={wert}; Path=/; HttpOnly; SameSite=Strict; Max-Age={max_age}",
            self.name
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie).ok()
    }
}

/// Token aus `Authorization: Bearer` oder dem Session-Cookie
///
/// Der Header hat Vorrang.
pub fn token_extrahieren(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    bearer_token(headers).or_else(|| cookie_token(headers, cookie_name))
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let wert = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let token = wert
        .strip_prefix("Bearer ")
        .or_else(|| wert.strip_prefix("bearer "))?
        .trim();
    (!token.is_empty()).then(|| token.to_string())
}

fn cookie_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|paar| paar.trim().split_once('='))
        .find(|(name, _)| name.trim() == cookie_name)
        .map(|(_, wert)| wert.trim().to_string())
        .filter(|wert| !wert.is_empty())
}
