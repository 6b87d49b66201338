//! In-Memory-Implementierung des IdentitaetRepository
//!
//! Fuer Tests und den Entwicklungsbetrieb. Die Eindeutigkeit der E-Mail wird
//! unter demselben Lock geprueft, unter dem eingefuegt wird.

use std::collections::HashMap;

use chrono::Utc;
use gatekeep_core::{IdentitaetId, Provider};
use parking_lot::Mutex;

use crate::error::{DbError, DbResult};
use crate::models::{IdentitaetRecord, IdentitaetUpdate, NeueIdentitaet};
use crate::repository::IdentitaetRepository;

/// In-Memory Credential-Store
#[derive(Debug, Default)]
pub struct InMemoryIdentitaeten {
    /// id -> Identitaet
    eintraege: Mutex<HashMap<IdentitaetId, IdentitaetRecord>>,
}

impl InMemoryIdentitaeten {
    pub fn neu() -> Self {
        Self::default()
    }

    /// Anzahl gespeicherter Identitaeten
    pub fn anzahl(&self) -> usize {
        self.eintraege.lock().len()
    }
}

impl IdentitaetRepository for InMemoryIdentitaeten {
    async fn get_by_email(&self, email: &str) -> DbResult<Option<IdentitaetRecord>> {
        Ok(self
            .eintraege
            .lock()
            .values()
            .find(|i| i.email == email)
            .cloned())
    }

    async fn get_by_id(&self, id: IdentitaetId) -> DbResult<Option<IdentitaetRecord>> {
        Ok(self.eintraege.lock().get(&id).cloned())
    }

    async fn create(&self, data: NeueIdentitaet<'_>) -> DbResult<IdentitaetRecord> {
        data.pruefen()?;

        let mut eintraege = self.eintraege.lock();
        if eintraege.values().any(|i| i.email == data.email) {
            return Err(DbError::EmailVergeben(data.email.to_string()));
        }

        let jetzt = Utc::now();
        let record = IdentitaetRecord {
            id: IdentitaetId::new(),
            email: data.email.to_string(),
            password_hash: data.password_hash.map(str::to_string),
            provider: data.provider,
            email_verified: data.email_verified,
            rollen: data.rollen,
            profil: data.profil,
            created_at: jetzt,
            updated_at: jetzt,
        };
        eintraege.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        id: IdentitaetId,
        data: IdentitaetUpdate,
    ) -> DbResult<IdentitaetRecord> {
        let mut eintraege = self.eintraege.lock();
        let identitaet = eintraege
            .get_mut(&id)
            .ok_or_else(|| DbError::nicht_gefunden(format!("Identitaet {id}")))?;

        if data.password_hash.is_some() && identitaet.provider != Provider::Local {
            return Err(DbError::ungueltige_daten(format!(
                "{}-Konto darf keinen Passwort-Hash haben",
                identitaet.provider
            )));
        }

        if data.ist_leer() {
            return Ok(identitaet.clone());
        }
        if let Some(hash) = data.password_hash {
            identitaet.password_hash = Some(hash);
        }
        if let Some(verifiziert) = data.email_verified {
            identitaet.email_verified = verifiziert;
        }
        if let Some(rollen) = data.rollen {
            identitaet.rollen = rollen;
        }
        if let Some(name) = data.anzeigename {
            identitaet.profil.anzeigename = name;
        }
        if let Some(url) = data.bild_url {
            identitaet.profil.bild_url = url;
        }
        identitaet.updated_at = Utc::now();
        Ok(identitaet.clone())
    }
}
