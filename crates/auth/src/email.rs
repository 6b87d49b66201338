//! E-Mail-Normalisierung
//!
//! Alle Lookups und Anlagen im Credential-Store verwenden die normalisierte
//! Form: ohne umgebende Leerzeichen, in Kleinbuchstaben.

/// Normalisiert eine E-Mail-Adresse fuer den Credential-Store
pub fn email_normalisieren(email: &str) -> String {
    email.trim().to_lowercase()
}
