//! Zustellung von Reset- und Verifikations-Links
//!
//! Der Auth-Kern erzeugt nur Tokens. Wie der Link den Menschen erreicht
//! (E-Mail, Konsole), entscheidet eine [`LinkZustellung`].

use std::future::Future;
use std::pin::Pin;

/// Typ-Alias fuer eine geboxte Send-Future
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Art des zugestellten Links
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkArt {
    PasswortReset,
    EmailVerifikation,
}

impl LinkArt {
    pub fn als_str(&self) -> &'static str {
        match self {
            Self::PasswortReset => "passwort_reset",
            Self::EmailVerifikation => "email_verifikation",
        }
    }
}

/// Stellt einen Link an eine E-Mail-Adresse zu
///
/// Fehler werden von der Implementierung selbst geloggt; die Anfrage
/// schlaegt deswegen nicht fehl.
pub trait LinkZustellung: Send + Sync + 'static {
    fn zustellen<'a>(&'a self, art: LinkArt, email: &'a str, link: &'a str) -> BoxFuture<'a, ()>;
}

/// Schreibt den Link ins Log (Entwicklung, Betrieb ohne Mailversand)
#[derive(Debug, Default, Clone, Copy)]
pub struct LogZustellung;

impl LinkZustellung for LogZustellung {
    fn zustellen<'a>(&'a self, art: LinkArt, email: &'a str, link: &'a str) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            tracing::info!(art = art.als_str(), email = %email, link = %link, "Link zugestellt");
        })
    }
}
