//! gatekeep-auth – Authentifizierungs- und Token-Kern
//!
//! Dieses Crate implementiert:
//! - Passwort-Hashing mit Argon2id
//! - Signierte, zweckgebundene Tokens (HS256) mit injizierbarer Uhr
//! - Pruefung lokaler Anmeldedaten
//! - OAuth-Profil-Projektion (Google, Facebook) und Konto-Abgleich
//! - Sessions als Zugangs-Tokens inkl. Rollenpruefung
//! - Passwort-Reset- und E-Mail-Verifikations-Flow
//! - AuthService (Registrierung, Login, Profil, Flows)

pub mod email;
pub mod error;
pub mod flow;
pub mod oauth;
pub mod password;
pub mod reconciler;
pub mod reset;
pub mod service;
pub mod session;
pub mod token;
pub mod validator;
pub mod verifikation;

// Bequeme Re-Exporte
pub use email::email_normalisieren;
pub use error::{AuthError, AuthResult};
pub use flow::{EmailClaims, FlowZustand};
pub use oauth::{provider_fuer, FacebookProvider, GoogleProvider, OAuthBehauptung, OAuthProvider};
pub use password::{Argon2Hasher, PasswortHasher};
pub use reconciler::KontoAbgleich;
pub use reset::PasswortResetFlow;
pub use service::{Anmeldung, AuthService, ProfilUpdate, Registrierung, TokenLaufzeiten};
pub use session::{rolle_erfordern, Principal, SessionAussteller, ZugangsClaims, ZugangsToken};
pub use token::{
    FesteUhr, SigniertesToken, SystemUhr, TokenCodec, TokenFehler, TokenZweck, Uhr,
    VerifizierteClaims,
};
pub use validator::AnmeldePruefer;
pub use verifikation::EmailVerifikationFlow;
