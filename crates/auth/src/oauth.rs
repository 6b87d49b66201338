//! OAuth-Provider-Profile
//!
//! Der Kern fuehrt keinen Redirect-/Code-Austausch durch. Er erhaelt das
//! rohe Profil, das ein Provider nach erfolgreicher Anmeldung liefert, und
//! extrahiert daraus eine [`OAuthBehauptung`] (E-Mail, Provider, Profil).

use gatekeep_core::Provider;
use gatekeep_db::Profil;
use serde::Deserialize;

use crate::email::email_normalisieren;
use crate::error::{AuthError, AuthResult};

/// Vom Provider behauptete Identitaet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthBehauptung {
    /// Normalisierte E-Mail
    pub email: String,
    pub provider: Provider,
    pub profil: Profil,
}

/// Ein externer Identitaetsanbieter
pub trait OAuthProvider: Send + Sync {
    fn provider(&self) -> Provider;

    /// Extrahiert die Behauptung aus dem rohen Provider-Profil
    ///
    /// Fehlt die E-Mail, ist das Ergebnis `EmailFehlt`.
    fn behauptung_extrahieren(&self, profil: &serde_json::Value) -> AuthResult<OAuthBehauptung>;
}

/// Liefert die Implementierung fuer einen OAuth-Provider
pub fn provider_fuer(provider: Provider) -> Option<Box<dyn OAuthProvider>> {
    match provider {
        Provider::Google => Some(Box::new(GoogleProvider)),
        Provider::Facebook => Some(Box::new(FacebookProvider)),
        Provider::Local => None,
    }
}

/// Ein Wert aus einer Profil-Liste (`emails`, `photos`)
#[derive(Debug, Deserialize)]
struct ProfilWert {
    value: Option<String>,
}

fn erster_wert(liste: Option<Vec<ProfilWert>>) -> Option<String> {
    liste
        .into_iter()
        .flatten()
        .find_map(|w| w.value.filter(|v| !v.trim().is_empty()))
}

fn nicht_leer(wert: Option<String>) -> Option<String> {
    wert.filter(|v| !v.trim().is_empty())
}

/// Nur ein Name als String zaehlt; Namensobjekte werden ignoriert
fn name_als_text(name: Option<serde_json::Value>) -> Option<String> {
    nicht_leer(name.and_then(|n| n.as_str().map(str::to_string)))
}

fn behauptung(
    provider: Provider,
    email: Option<String>,
    profil: Profil,
) -> AuthResult<OAuthBehauptung> {
    let email = email
        .map(|e| email_normalisieren(&e))
        .filter(|e| !e.is_empty())
        .ok_or(AuthError::EmailFehlt)?;
    Ok(OAuthBehauptung {
        email,
        provider,
        profil,
    })
}

fn profil_lesen<'a, T: Deserialize<'a>>(profil: &'a serde_json::Value) -> AuthResult<T> {
    T::deserialize(profil).map_err(|e| AuthError::ProfilUngueltig(e.to_string()))
}

// ---------------------------------------------------------------------------
// Google
// ---------------------------------------------------------------------------

/// Google-Profil: OpenID-Userinfo (`email`, `name`, `picture`) oder
/// normalisiertes Profil (`emails`, `displayName`, `photos`)
#[derive(Debug, Deserialize)]
struct GoogleProfil {
    email: Option<String>,
    emails: Option<Vec<ProfilWert>>,
    /// Userinfo: String; normalisiert: Objekt mit Namensteilen
    name: Option<serde_json::Value>,
    #[serde(rename = "displayName")]
    display_name: Option<String>,
    picture: Option<String>,
    photos: Option<Vec<ProfilWert>>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct GoogleProvider;

impl OAuthProvider for GoogleProvider {
    fn provider(&self) -> Provider {
        Provider::Google
    }

    fn behauptung_extrahieren(&self, profil: &serde_json::Value) -> AuthResult<OAuthBehauptung> {
        let p: GoogleProfil = profil_lesen(profil)?;
        let email = nicht_leer(p.email).or_else(|| erster_wert(p.emails));
        let profil = Profil {
            anzeigename: name_als_text(p.name).or_else(|| nicht_leer(p.display_name)),
            bild_url: nicht_leer(p.picture).or_else(|| erster_wert(p.photos)),
        };
        behauptung(Provider::Google, email, profil)
    }
}

// ---------------------------------------------------------------------------
// Facebook
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct FacebookBildDaten {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FacebookBild {
    data: Option<FacebookBildDaten>,
}

/// Facebook-Profil: Graph-API (`email`, `name`, `picture.data.url`) oder
/// normalisiertes Profil (`emails`, `displayName`, `photos`)
#[derive(Debug, Deserialize)]
struct FacebookProfil {
    email: Option<String>,
    emails: Option<Vec<ProfilWert>>,
    /// Graph-API: String; normalisiert: Objekt mit Namensteilen
    name: Option<serde_json::Value>,
    #[serde(rename = "displayName")]
    display_name: Option<String>,
    picture: Option<FacebookBild>,
    photos: Option<Vec<ProfilWert>>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FacebookProvider;

impl OAuthProvider for FacebookProvider {
    fn provider(&self) -> Provider {
        Provider::Facebook
    }

    fn behauptung_extrahieren(&self, profil: &serde_json::Value) -> AuthResult<OAuthBehauptung> {
        let p: FacebookProfil = profil_lesen(profil)?;
        let email = erster_wert(p.emails).or_else(|| nicht_leer(p.email));
        let name = name_als_text(p.name);
        let bild = p
            .picture
            .and_then(|b| b.data)
            .and_then(|d| nicht_leer(d.url));
        let profil = Profil {
            anzeigename: nicht_leer(p.display_name).or(name),
            bild_url: erster_wert(p.photos).or(bild),
        };
        behauptung(Provider::Facebook, email, profil)
    }
}
