//! Passwort-Reset-Flow
//!
//! Nur lokale Konten haben ein Passwort und koennen es zuruecksetzen.
//! Die Zustellung des Tokens (z.B. per E-Mail) ist Sache des Aufrufers.

use std::sync::Arc;

use chrono::Duration;
use gatekeep_core::Provider;
use gatekeep_db::{IdentitaetRecord, IdentitaetRepository, IdentitaetUpdate};

use crate::email::email_normalisieren;
use crate::error::{AuthError, AuthResult};
use crate::flow::{flow_token_lesen, EmailClaims, FlowZustand};
use crate::password::{hashen_blockierend, passwort_pruefen, PasswortHasher};
use crate::token::{SigniertesToken, TokenCodec, TokenFehler, TokenZweck};

/// Stellt Reset-Tokens aus und loest sie ein
pub struct PasswortResetFlow<U: IdentitaetRepository, H: PasswortHasher> {
    repo: Arc<U>,
    hasher: Arc<H>,
    codec: Arc<TokenCodec>,
    ttl: Duration,
}

impl<U: IdentitaetRepository, H: PasswortHasher> PasswortResetFlow<U, H> {
    pub fn neu(repo: Arc<U>, hasher: Arc<H>, codec: Arc<TokenCodec>, ttl: Duration) -> Self {
        Self {
            repo,
            hasher,
            codec,
            ttl,
        }
    }

    /// Fordert einen Reset an
    ///
    /// Fehler: `NichtGefunden` (keine Identitaet), `FalscherProvider` (OAuth-Konto).
    pub async fn reset_anfordern(&self, email: &str) -> AuthResult<SigniertesToken> {
        let email = email_normalisieren(email);
        let identitaet = self.lokale_identitaet(&email).await?;

        let token = self.codec.signieren(
            &EmailClaims {
                email: identitaet.email.clone(),
            },
            TokenZweck::PasswortReset,
            self.ttl,
        )?;

        tracing::info!(
            user_id = %identitaet.id,
            laeuft_ab_am = %token.laeuft_ab_am,
            "Passwort-Reset angefordert"
        );
        Ok(token)
    }

    /// Loest ein Reset-Token ein und ersetzt den Passwort-Hash
    ///
    /// Fehler: `TokenUngueltig`, `NichtGefunden`, `FalscherProvider`.
    pub async fn reset_einloesen(
        &self,
        token: &str,
        neues_passwort: &str,
    ) -> AuthResult<IdentitaetRecord> {
        let claims = flow_token_lesen(&self.codec, token, TokenZweck::PasswortReset)?
            .ok_or(AuthError::TokenUngueltig(TokenFehler::Abgelaufen))?
            .claims;

        let identitaet = self.lokale_identitaet(&claims.email).await?;
        passwort_pruefen(neues_passwort)?;

        let hash = hashen_blockierend(&self.hasher, neues_passwort).await?;
        let aktualisiert = self
            .repo
            .update(
                identitaet.id,
                IdentitaetUpdate {
                    password_hash: Some(hash),
                    ..Default::default()
                },
            )
            .await?;

        tracing::info!(user_id = %aktualisiert.id, "Passwort zurueckgesetzt");
        Ok(aktualisiert)
    }

    /// Zustand eines Reset-Tokens (`Ausstehend` oder `Abgelaufen`)
    ///
    /// Da Einloesungen nicht protokolliert werden, bleibt ein gueltiges
    /// Reset-Token bis zum Ablauf `Ausstehend`.
    pub fn status(&self, token: &str) -> AuthResult<FlowZustand> {
        Ok(
            match flow_token_lesen(&self.codec, token, TokenZweck::PasswortReset)? {
                Some(_) => FlowZustand::Ausstehend,
                None => FlowZustand::Abgelaufen,
            },
        )
    }

    async fn lokale_identitaet(&self, email: &str) -> AuthResult<IdentitaetRecord> {
        let identitaet = self
            .repo
            .get_by_email(email)
            .await?
            .ok_or_else(|| AuthError::NichtGefunden(email.to_string()))?;
        if identitaet.provider != Provider::Local {
            return Err(AuthError::FalscherProvider {
                provider: identitaet.provider,
            });
        }
        Ok(identitaet)
    }
}
