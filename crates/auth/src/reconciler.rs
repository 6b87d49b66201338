//! Abgleich von OAuth-Identitaeten mit dem Credential-Store
//!
//! Eine E-Mail gehoert genau einem Konto und damit genau einem Provider.
//! Meldet sich jemand ueber einen anderen Provider an als den, mit dem das
//! Konto angelegt wurde, wird abgelehnt und der gespeicherte Provider
//! genannt. Konten werden nie stillschweigend verknuepft.

use std::sync::Arc;

use gatekeep_core::Provider;
use gatekeep_db::{IdentitaetRecord, IdentitaetRepository, NeueIdentitaet, Profil};

use crate::email::email_normalisieren;
use crate::error::{AuthError, AuthResult};
use crate::oauth::OAuthBehauptung;

/// Findet oder erstellt die Identitaet zu einer OAuth-Anmeldung
pub struct KontoAbgleich<U: IdentitaetRepository> {
    repo: Arc<U>,
}

impl<U: IdentitaetRepository> KontoAbgleich<U> {
    pub fn neu(repo: Arc<U>) -> Self {
        Self { repo }
    }

    /// Abgleich nur anhand von E-Mail und Provider
    pub async fn oauth_identitaet_abgleichen(
        &self,
        email: &str,
        provider: Provider,
    ) -> AuthResult<IdentitaetRecord> {
        self.abgleichen(&OAuthBehauptung {
            email: email_normalisieren(email),
            provider,
            profil: Profil::default(),
        })
        .await
    }

    /// Abgleich einer vollstaendigen Behauptung
    ///
    /// - vorhandenes Konto mit gleichem Provider: wird unveraendert zurueckgegeben
    /// - vorhandenes Konto mit anderem Provider: `ProviderKonflikt`
    /// - kein Konto: neues, verifiziertes OAuth-Konto ohne Passwort
    pub async fn abgleichen(&self, behauptung: &OAuthBehauptung) -> AuthResult<IdentitaetRecord> {
        if !behauptung.provider.ist_oauth() {
            return Err(AuthError::FalscherProvider {
                provider: behauptung.provider,
            });
        }

        let email = email_normalisieren(&behauptung.email);
        if email.is_empty() {
            return Err(AuthError::EmailFehlt);
        }

        if let Some(vorhanden) = self.repo.get_by_email(&email).await? {
            return provider_pruefen(vorhanden, behauptung.provider);
        }

        let neu = NeueIdentitaet::oauth(&email, behauptung.provider, behauptung.profil.clone());
        match self.repo.create(neu).await {
            Ok(identitaet) => {
                tracing::info!(
                    user_id = %identitaet.id,
                    provider = %identitaet.provider,
                    "OAuth-Konto angelegt"
                );
                Ok(identitaet)
            }
            Err(e) if e.ist_eindeutigkeit() => {
                // Paralleles Anlegen: das andere Konto gewinnt
                tracing::debug!(email = %email, "Konto parallel angelegt, lade erneut");
                let vorhanden = self.repo.get_by_email(&email).await?.ok_or_else(|| {
                    AuthError::intern("Konto nach Eindeutigkeitsfehler nicht auffindbar")
                })?;
                provider_pruefen(vorhanden, behauptung.provider)
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn provider_pruefen(
    vorhanden: IdentitaetRecord,
    provider: Provider,
) -> AuthResult<IdentitaetRecord> {
    if vorhanden.provider != provider {
        tracing::info!(
            user_id = %vorhanden.id,
            vorhanden = %vorhanden.provider,
            versucht = %provider,
            "OAuth-Anmeldung mit fremdem Provider abgelehnt"
        );
        return Err(AuthError::ProviderKonflikt {
            vorhanden: vorhanden.provider,
        });
    }
    Ok(vorhanden)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use gatekeep_core::IdentitaetId;
    use gatekeep_db::{DbResult, IdentitaetUpdate, InMemoryIdentitaeten};

    use super::*;

    fn abgleich() -> (KontoAbgleich<InMemoryIdentitaeten>, Arc<InMemoryIdentitaeten>) {
        let repo = Arc::new(InMemoryIdentitaeten::neu());
        (KontoAbgleich::neu(repo.clone()), repo)
    }

    #[tokio::test]
    async fn neues_konto_wird_angelegt() {
        let (abgleich, repo) = abgleich();
        let identitaet = abgleich
            .oauth_identitaet_abgleichen("Bob@Gmail.com", Provider::Google)
            .await
            .unwrap();
        assert_eq!(identitaet.email, "bob@gmail.com");
        assert_eq!(identitaet.provider, Provider::Google);
        assert!(identitaet.email_verified);
        assert!(identitaet.password_hash.is_none());
        assert_eq!(repo.anzahl(), 1);
    }

    #[tokio::test]
    async fn gleicher_provider_findet_konto() {
        let (abgleich, repo) = abgleich();
        let erst = abgleich
            .oauth_identitaet_abgleichen("bob@gmail.com", Provider::Google)
            .await
            .unwrap();
        let zweit = abgleich
            .oauth_identitaet_abgleichen("bob@gmail.com", Provider::Google)
            .await
            .unwrap();
        assert_eq!(erst.id, zweit.id);
        assert_eq!(repo.anzahl(), 1);
    }

    #[tokio::test]
    async fn lokales_konto_blockiert_oauth() {
        let (abgleich, repo) = abgleich();
        let lokal = repo
            .create(NeueIdentitaet::lokal("alice@x.com", "$argon2id$hash"))
            .await
            .unwrap();

        let e = abgleich
            .oauth_identitaet_abgleichen("alice@x.com", Provider::Google)
            .await
            .unwrap_err();
        assert!(matches!(
            e,
            AuthError::ProviderKonflikt {
                vorhanden: Provider::Local
            }
        ));

        // Konto bleibt unveraendert
        let danach = repo.get_by_id(lokal.id).await.unwrap().unwrap();
        assert_eq!(danach, lokal);
        assert_eq!(repo.anzahl(), 1);
    }

    #[tokio::test]
    async fn oauth_konten_verschiedener_provider_kollidieren() {
        let (abgleich, _) = abgleich();
        abgleich
            .oauth_identitaet_abgleichen("carol@x.com", Provider::Facebook)
            .await
            .unwrap();
        let e = abgleich
            .oauth_identitaet_abgleichen("carol@x.com", Provider::Google)
            .await
            .unwrap_err();
        assert!(matches!(
            e,
            AuthError::ProviderKonflikt {
                vorhanden: Provider::Facebook
            }
        ));
    }

    #[tokio::test]
    async fn fehlende_email_beruehrt_den_store_nicht() {
        let (abgleich, repo) = abgleich();
        let e = abgleich
            .oauth_identitaet_abgleichen("  ", Provider::Google)
            .await
            .unwrap_err();
        assert!(matches!(e, AuthError::EmailFehlt));
        assert_eq!(repo.anzahl(), 0);
    }

    #[tokio::test]
    async fn lokal_ist_kein_oauth_provider() {
        let (abgleich, _) = abgleich();
        let e = abgleich
            .oauth_identitaet_abgleichen("a@x.com", Provider::Local)
            .await
            .unwrap_err();
        assert!(matches!(e, AuthError::FalscherProvider { .. }));
    }

    #[tokio::test]
    async fn profil_wird_uebernommen() {
        let (abgleich, _) = abgleich();
        let identitaet = abgleich
            .abgleichen(&OAuthBehauptung {
                email: "dave@x.com".into(),
                provider: Provider::Google,
                profil: Profil {
                    anzeigename: Some("Dave".into()),
                    bild_url: None,
                },
            })
            .await
            .unwrap();
        assert_eq!(identitaet.profil.anzeigename.as_deref(), Some("Dave"));
    }

    /// Simuliert ein paralleles Anlegen zwischen Lookup und Create
    struct RennendesRepo {
        inner: InMemoryIdentitaeten,
        konkurrent: Provider,
        ausgeloest: AtomicBool,
    }

    impl IdentitaetRepository for RennendesRepo {
        async fn get_by_email(&self, email: &str) -> DbResult<Option<IdentitaetRecord>> {
            self.inner.get_by_email(email).await
        }

        async fn get_by_id(&self, id: IdentitaetId) -> DbResult<Option<IdentitaetRecord>> {
            self.inner.get_by_id(id).await
        }

        async fn create(&self, data: NeueIdentitaet<'_>) -> DbResult<IdentitaetRecord> {
            if !self.ausgeloest.swap(true, Ordering::SeqCst) {
                self.inner
                    .create(NeueIdentitaet::oauth(
                        data.email,
                        self.konkurrent,
                        Profil::default(),
                    ))
                    .await?;
            }
            self.inner.create(data).await
        }

        async fn update(
            &self,
            id: IdentitaetId,
            data: IdentitaetUpdate,
        ) -> DbResult<IdentitaetRecord> {
            self.inner.update(id, data).await
        }
    }

    fn rennendes_repo(konkurrent: Provider) -> Arc<RennendesRepo> {
        Arc::new(RennendesRepo {
            inner: InMemoryIdentitaeten::neu(),
            konkurrent,
            ausgeloest: AtomicBool::new(false),
        })
    }

    #[tokio::test]
    async fn paralleles_anlegen_gleicher_provider() {
        let repo = rennendes_repo(Provider::Google);
        let abgleich = KontoAbgleich::neu(repo.clone());
        let identitaet = abgleich
            .oauth_identitaet_abgleichen("eve@x.com", Provider::Google)
            .await
            .unwrap();
        assert_eq!(identitaet.provider, Provider::Google);
        assert_eq!(repo.inner.anzahl(), 1);
    }

    #[tokio::test]
    async fn paralleles_anlegen_anderer_provider() {
        let repo = rennendes_repo(Provider::Facebook);
        let abgleich = KontoAbgleich::neu(repo.clone());
        let e = abgleich
            .oauth_identitaet_abgleichen("eve@x.com", Provider::Google)
            .await
            .unwrap_err();
        assert!(matches!(
            e,
            AuthError::ProviderKonflikt {
                vorhanden: Provider::Facebook
            }
        ));
        assert_eq!(repo.inner.anzahl(), 1);
    }
}
