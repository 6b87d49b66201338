//! Pruefung lokaler Anmeldedaten
//!
//! Reihenfolge der Pruefungen:
//! 1. Identitaet zur E-Mail vorhanden? Sonst `NichtGefunden`.
//! 2. Provider lokal? Sonst `FalscherProvider`, ohne den Hasher aufzurufen.
//! 3. Passwort passt zum gespeicherten Hash? Sonst `FalschesPasswort`.

use std::sync::Arc;

use gatekeep_core::Provider;
use gatekeep_db::{IdentitaetRecord, IdentitaetRepository};

use crate::email::email_normalisieren;
use crate::error::{AuthError, AuthResult};
use crate::password::{verifizieren_blockierend, PasswortHasher};

/// Prueft E-Mail + Passwort gegen den Credential-Store
pub struct AnmeldePruefer<U: IdentitaetRepository, H: PasswortHasher> {
    repo: Arc<U>,
    hasher: Arc<H>,
}

impl<U: IdentitaetRepository, H: PasswortHasher> AnmeldePruefer<U, H> {
    pub fn neu(repo: Arc<U>, hasher: Arc<H>) -> Self {
        Self { repo, hasher }
    }

    /// Gibt die Identitaet bei korrekten Anmeldedaten zurueck
    pub async fn lokale_anmeldung_pruefen(
        &self,
        email: &str,
        passwort: &str,
    ) -> AuthResult<IdentitaetRecord> {
        let email = email_normalisieren(email);

        let identitaet = self
            .repo
            .get_by_email(&email)
            .await?
            .ok_or_else(|| AuthError::NichtGefunden(email.clone()))?;

        if identitaet.provider != Provider::Local {
            tracing::debug!(
                user_id = %identitaet.id,
                provider = %identitaet.provider,
                "Passwort-Login fuer OAuth-Konto abgelehnt"
            );
            return Err(AuthError::FalscherProvider {
                provider: identitaet.provider,
            });
        }

        let hash = identitaet
            .password_hash
            .as_deref()
            .ok_or_else(|| AuthError::intern("Lokales Konto ohne Passwort-Hash"))?;

        if !verifizieren_blockierend(&self.hasher, passwort, hash).await? {
            tracing::debug!(user_id = %identitaet.id, "Falsches Passwort");
            return Err(AuthError::FalschesPasswort);
        }

        Ok(identitaet)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use gatekeep_db::{InMemoryIdentitaeten, NeueIdentitaet, Profil};

    use super::*;
    use crate::password::Argon2Hasher;

    /// Hasher, der seine Aufrufe zaehlt
    #[derive(Default)]
    pub(crate) struct ZaehlHasher {
        pub(crate) aufrufe: AtomicUsize,
    }

    impl PasswortHasher for ZaehlHasher {
        fn hashen(&self, passwort: &str) -> AuthResult<String> {
            self.aufrufe.fetch_add(1, Ordering::SeqCst);
            Ok(format!("klar:{passwort}"))
        }

        fn verifizieren(&self, passwort: &str, hash: &str) -> AuthResult<bool> {
            self.aufrufe.fetch_add(1, Ordering::SeqCst);
            Ok(hash == format!("klar:{passwort}"))
        }
    }

    async fn repo_mit_konten(hasher: &impl PasswortHasher) -> Arc<InMemoryIdentitaeten> {
        let repo = Arc::new(InMemoryIdentitaeten::neu());
        let hash = hasher.hashen("secret123").unwrap();
        repo.create(NeueIdentitaet::lokal("alice@x.com", &hash))
            .await
            .unwrap();
        repo.create(NeueIdentitaet::oauth(
            "bob@x.com",
            Provider::Google,
            Profil::default(),
        ))
        .await
        .unwrap();
        repo
    }

    #[tokio::test]
    async fn korrekte_anmeldedaten() {
        let hasher = Arc::new(Argon2Hasher::mit_parametern(1024, 1, 1).unwrap());
        let repo = repo_mit_konten(hasher.as_ref()).await;
        let pruefer = AnmeldePruefer::neu(repo, hasher);

        let identitaet = pruefer
            .lokale_anmeldung_pruefen("Alice@X.com", "secret123")
            .await
            .unwrap();
        assert_eq!(identitaet.email, "alice@x.com");
    }

    #[tokio::test]
    async fn falsches_passwort() {
        let hasher = Arc::new(ZaehlHasher::default());
        let repo = repo_mit_konten(hasher.as_ref()).await;
        let pruefer = AnmeldePruefer::neu(repo, hasher);

        let e = pruefer
            .lokale_anmeldung_pruefen("alice@x.com", "wrong")
            .await
            .unwrap_err();
        assert!(matches!(e, AuthError::FalschesPasswort));
    }

    #[tokio::test]
    async fn unbekannte_email() {
        let hasher = Arc::new(ZaehlHasher::default());
        let repo = repo_mit_konten(hasher.as_ref()).await;
        let pruefer = AnmeldePruefer::neu(repo, hasher.clone());
        let vorher = hasher.aufrufe.load(Ordering::SeqCst);

        let e = pruefer
            .lokale_anmeldung_pruefen("niemand@x.com", "secret123")
            .await
            .unwrap_err();
        assert!(matches!(e, AuthError::NichtGefunden(_)));
        assert_eq!(hasher.aufrufe.load(Ordering::SeqCst), vorher);
    }

    #[tokio::test]
    async fn oauth_konto_ruft_hasher_nicht_auf() {
        let hasher = Arc::new(ZaehlHasher::default());
        let repo = repo_mit_konten(hasher.as_ref()).await;
        let pruefer = AnmeldePruefer::neu(repo, hasher.clone());
        let vorher = hasher.aufrufe.load(Ordering::SeqCst);

        let e = pruefer
            .lokale_anmeldung_pruefen("bob@x.com", "irgendwas")
            .await
            .unwrap_err();
        assert!(matches!(
            e,
            AuthError::FalscherProvider {
                provider: Provider::Google
            }
        ));
        assert_eq!(hasher.aufrufe.load(Ordering::SeqCst), vorher);
    }
}
