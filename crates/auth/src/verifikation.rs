//! E-Mail-Verifikations-Flow

use std::sync::Arc;

use chrono::Duration;
use gatekeep_db::{IdentitaetRecord, IdentitaetRepository, IdentitaetUpdate};

use crate::error::{AuthError, AuthResult};
use crate::flow::{flow_token_lesen, EmailClaims, FlowZustand};
use crate::token::{SigniertesToken, TokenCodec, TokenFehler, TokenZweck};

/// Stellt Verifikations-Tokens aus und loest sie ein
pub struct EmailVerifikationFlow<U: IdentitaetRepository> {
    repo: Arc<U>,
    codec: Arc<TokenCodec>,
    ttl: Duration,
}

impl<U: IdentitaetRepository> EmailVerifikationFlow<U> {
    pub fn neu(repo: Arc<U>, codec: Arc<TokenCodec>, ttl: Duration) -> Self {
        Self { repo, codec, ttl }
    }

    /// Erstellt ein Verifikations-Token fuer eine Identitaet (bei der Registrierung)
    pub fn verifikation_anfordern(
        &self,
        identitaet: &IdentitaetRecord,
    ) -> AuthResult<SigniertesToken> {
        self.codec.signieren(
            &EmailClaims {
                email: identitaet.email.clone(),
            },
            TokenZweck::EmailVerifikation,
            self.ttl,
        )
    }

    /// Loest ein Verifikations-Token ein
    ///
    /// Idempotent: ist die E-Mail bereits verifiziert, wird nichts geschrieben.
    pub async fn verifikation_einloesen(&self, token: &str) -> AuthResult<IdentitaetRecord> {
        let claims = flow_token_lesen(&self.codec, token, TokenZweck::EmailVerifikation)?
            .ok_or(AuthError::TokenUngueltig(TokenFehler::Abgelaufen))?
            .claims;

        let identitaet = self.identitaet(&claims.email).await?;
        if identitaet.email_verified {
            return Ok(identitaet);
        }

        let aktualisiert = self
            .repo
            .update(
                identitaet.id,
                IdentitaetUpdate {
                    email_verified: Some(true),
                    ..Default::default()
                },
            )
            .await?;

        tracing::info!(user_id = %aktualisiert.id, "E-Mail verifiziert");
        Ok(aktualisiert)
    }

    /// Zustand eines Verifikations-Tokens
    ///
    /// `Eingeloest` sobald die Identitaet verifiziert ist, sonst `Ausstehend`
    /// bzw. `Abgelaufen`.
    pub async fn status(&self, token: &str) -> AuthResult<FlowZustand> {
        let Some(geprueft) = flow_token_lesen(&self.codec, token, TokenZweck::EmailVerifikation)?
        else {
            return Ok(FlowZustand::Abgelaufen);
        };

        let identitaet = self.identitaet(&geprueft.claims.email).await?;
        Ok(if identitaet.email_verified {
            FlowZustand::Eingeloest
        } else {
            FlowZustand::Ausstehend
        })
    }

    async fn identitaet(&self, email: &str) -> AuthResult<IdentitaetRecord> {
        self.repo
            .get_by_email(email)
            .await?
            .ok_or_else(|| AuthError::NichtGefunden(email.to_string()))
    }
}
