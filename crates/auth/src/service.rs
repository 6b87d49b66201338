//! Auth-Service fuer gatekeep
//!
//! Zentraler Einstiegspunkt fuer Registrierung, Login (lokal und OAuth),
//! Session-Pruefung, Profilpflege und die Token-Flows. Verdrahtet die
//! Einzelkomponenten ueber gemeinsame `Arc`s auf Store, Hasher und Codec.

use std::sync::Arc;

use chrono::Duration;
use gatekeep_core::{IdentitaetId, Provider};
use gatekeep_db::{IdentitaetRecord, IdentitaetRepository, IdentitaetUpdate, NeueIdentitaet};
use serde::Deserialize;

use crate::{
    email::email_normalisieren,
    error::{AuthError, AuthResult},
    oauth::OAuthProvider,
    password::{hashen_blockierend, passwort_pruefen, Argon2Hasher, PasswortHasher},
    reconciler::KontoAbgleich,
    reset::PasswortResetFlow,
    session::{Principal, SessionAussteller, ZugangsToken},
    token::{SigniertesToken, TokenCodec},
    validator::AnmeldePruefer,
    verifikation::EmailVerifikationFlow,
};

/// Laufzeiten der ausgestellten Tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLaufzeiten {
    pub zugang: Duration,
    pub passwort_reset: Duration,
    pub email_verifikation: Duration,
}

impl Default for TokenLaufzeiten {
    fn default() -> Self {
        Self {
            zugang: Duration::days(7),
            passwort_reset: Duration::minutes(15),
            email_verifikation: Duration::minutes(15),
        }
    }
}

/// Ergebnis einer Registrierung
#[derive(Debug, Clone)]
pub struct Registrierung {
    pub identitaet: IdentitaetRecord,
    /// Zuzustellendes Verifikations-Token
    pub verifikation: SigniertesToken,
}

/// Ergebnis eines erfolgreichen Logins
#[derive(Debug, Clone)]
pub struct Anmeldung {
    pub identitaet: IdentitaetRecord,
    pub session: ZugangsToken,
}

/// Aenderbare Profilfelder; `None` laesst ein Feld unveraendert,
/// ein leerer String loescht es
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProfilUpdate {
    pub anzeigename: Option<String>,
    pub bild_url: Option<String>,
}

impl ProfilUpdate {
    fn in_update(self) -> IdentitaetUpdate {
        fn feld(wert: Option<String>) -> Option<Option<String>> {
            wert.map(|w| {
                let w = w.trim().to_string();
                (!w.is_empty()).then_some(w)
            })
        }
        IdentitaetUpdate {
            anzeigename: feld(self.anzeigename),
            bild_url: feld(self.bild_url),
            ..Default::default()
        }
    }
}

/// Auth-Service – zentraler Einstiegspunkt fuer alle Authentifizierungsvorgaenge
pub struct AuthService<U: IdentitaetRepository, H: PasswortHasher = Argon2Hasher> {
    repo: Arc<U>,
    hasher: Arc<H>,
    pruefer: AnmeldePruefer<U, H>,
    abgleich: KontoAbgleich<U>,
    sessions: SessionAussteller,
    reset: PasswortResetFlow<U, H>,
    verifikation: EmailVerifikationFlow<U>,
}

impl<U: IdentitaetRepository, H: PasswortHasher> AuthService<U, H> {
    /// Erstellt einen neuen AuthService
    pub fn neu(
        repo: Arc<U>,
        hasher: Arc<H>,
        codec: Arc<TokenCodec>,
        laufzeiten: TokenLaufzeiten,
    ) -> Self {
        Self {
            pruefer: AnmeldePruefer::neu(repo.clone(), hasher.clone()),
            abgleich: KontoAbgleich::neu(repo.clone()),
            sessions: SessionAussteller::neu(codec.clone(), laufzeiten.zugang),
            reset: PasswortResetFlow::neu(
                repo.clone(),
                hasher.clone(),
                codec.clone(),
                laufzeiten.passwort_reset,
            ),
            verifikation: EmailVerifikationFlow::neu(
                repo.clone(),
                codec,
                laufzeiten.email_verifikation,
            ),
            repo,
            hasher,
        }
    }

    // --- Komponenten ---

    pub fn pruefer(&self) -> &AnmeldePruefer<U, H> {
        &self.pruefer
    }

    pub fn abgleich(&self) -> &KontoAbgleich<U> {
        &self.abgleich
    }

    pub fn sessions(&self) -> &SessionAussteller {
        &self.sessions
    }

    pub fn passwort_reset(&self) -> &PasswortResetFlow<U, H> {
        &self.reset
    }

    pub fn email_verifikation(&self) -> &EmailVerifikationFlow<U> {
        &self.verifikation
    }

    // --- Registrierung und Login ---

    /// Registriert ein lokales Konto und erzeugt das Verifikations-Token
    ///
    /// Existiert die E-Mail bereits mit einem OAuth-Provider, ist das Ergebnis
    /// `ProviderKonflikt`, sonst `EmailVergeben`.
    pub async fn registrieren(&self, email: &str, passwort: &str) -> AuthResult<Registrierung> {
        let email = email_normalisieren(email);
        if !email_plausibel(&email) {
            return Err(AuthError::EmailUngueltig(email));
        }

        if let Some(vorhanden) = self.repo.get_by_email(&email).await? {
            return Err(vorhanden_fehler(&vorhanden));
        }
        passwort_pruefen(passwort)?;

        let hash = hashen_blockierend(&self.hasher, passwort).await?;
        let identitaet = match self.repo.create(NeueIdentitaet::lokal(&email, &hash)).await {
            Ok(identitaet) => identitaet,
            Err(e) if e.ist_eindeutigkeit() => {
                // Paralleles Anlegen; Fehler anhand des gewinnenden Kontos
                return Err(match self.repo.get_by_email(&email).await? {
                    Some(vorhanden) => vorhanden_fehler(&vorhanden),
                    None => AuthError::EmailVergeben(email),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let verifikation = self.verifikation.verifikation_anfordern(&identitaet)?;

        tracing::info!(
            user_id = %identitaet.id,
            email = %identitaet.email,
            "Neues lokales Konto registriert"
        );

        Ok(Registrierung {
            identitaet,
            verifikation,
        })
    }

    /// Prueft E-Mail + Passwort und stellt eine Session aus
    pub async fn lokal_anmelden(&self, email: &str, passwort: &str) -> AuthResult<Anmeldung> {
        let identitaet = self.pruefer.lokale_anmeldung_pruefen(email, passwort).await?;
        let session = self.sessions.session_ausstellen(&identitaet)?;

        tracing::info!(user_id = %identitaet.id, provider = %identitaet.provider, "Login erfolgreich");
        Ok(Anmeldung {
            identitaet,
            session,
        })
    }

    /// Gleicht ein OAuth-Profil ab und stellt eine Session aus
    pub async fn oauth_anmelden(
        &self,
        provider: &dyn OAuthProvider,
        profil: &serde_json::Value,
    ) -> AuthResult<Anmeldung> {
        let behauptung = provider.behauptung_extrahieren(profil)?;
        let identitaet = self.abgleich.abgleichen(&behauptung).await?;
        let session = self.sessions.session_ausstellen(&identitaet)?;

        tracing::info!(user_id = %identitaet.id, provider = %identitaet.provider, "Login erfolgreich");
        Ok(Anmeldung {
            identitaet,
            session,
        })
    }

    // --- Session ---

    /// Prueft ein Zugangs-Token
    pub fn session_pruefen(&self, token: &str) -> AuthResult<Principal> {
        self.sessions.session_pruefen(token)
    }

    /// Laedt die Identitaet des Aufrufers
    pub async fn aktuelle_identitaet(&self, principal: &Principal) -> AuthResult<IdentitaetRecord> {
        self.repo
            .get_by_id(principal.id)
            .await?
            .ok_or_else(|| AuthError::NichtGefunden(principal.id.to_string()))
    }

    /// Aendert Anzeigename und Bild
    pub async fn profil_aktualisieren(
        &self,
        id: IdentitaetId,
        update: ProfilUpdate,
    ) -> AuthResult<IdentitaetRecord> {
        let update = update.in_update();
        if update.ist_leer() {
            return self
                .repo
                .get_by_id(id)
                .await?
                .ok_or_else(|| AuthError::NichtGefunden(id.to_string()));
        }
        let identitaet = self.repo.update(id, update).await?;
        tracing::info!(user_id = %identitaet.id, "Profil aktualisiert");
        Ok(identitaet)
    }

    // --- Flows ---

    pub async fn reset_anfordern(&self, email: &str) -> AuthResult<SigniertesToken> {
        self.reset.reset_anfordern(email).await
    }

    pub async fn reset_einloesen(
        &self,
        token: &str,
        neues_passwort: &str,
    ) -> AuthResult<IdentitaetRecord> {
        self.reset.reset_einloesen(token, neues_passwort).await
    }

    pub async fn verifikation_einloesen(&self, token: &str) -> AuthResult<IdentitaetRecord> {
        self.verifikation.verifikation_einloesen(token).await
    }
}

/// Grobe Formpruefung: genau ein `@` mit Text davor und danach
fn email_plausibel(email: &str) -> bool {
    matches!(email.split_once('@'), Some((lokal, domain))
        if !lokal.is_empty() && !domain.is_empty() && !domain.contains('@'))
}

fn vorhanden_fehler(vorhanden: &IdentitaetRecord) -> AuthError {
    if vorhanden.provider == Provider::Local {
        AuthError::EmailVergeben(vorhanden.email.clone())
    } else {
        AuthError::ProviderKonflikt {
            vorhanden: vorhanden.provider,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use chrono::Utc;
    use gatekeep_core::Rolle;
    use gatekeep_db::InMemoryIdentitaeten;
    use serde_json::json;

    use super::*;
    use crate::oauth::GoogleProvider;
    use crate::token::FesteUhr;
    use crate::validator::tests::ZaehlHasher;

    fn service() -> (
        AuthService<InMemoryIdentitaeten, ZaehlHasher>,
        Arc<InMemoryIdentitaeten>,
        Arc<ZaehlHasher>,
    ) {
        let repo = Arc::new(InMemoryIdentitaeten::neu());
        let hasher = Arc::new(ZaehlHasher::default());
        let codec = TokenCodec::neu(b"service-test-geheimnis-0123456789a")
            .unwrap()
            .mit_uhr(Arc::new(FesteUhr::neu(Utc::now())));
        let service = AuthService::neu(
            repo.clone(),
            hasher.clone(),
            Arc::new(codec),
            TokenLaufzeiten::default(),
        );
        (service, repo, hasher)
    }

    #[tokio::test]
    async fn registrieren_erstellt_lokales_konto() {
        let (service, _, _) = service();
        let reg = service.registrieren("Alice@X.com", "secret123").await.unwrap();
        assert_eq!(reg.identitaet.email, "alice@x.com");
        assert_eq!(reg.identitaet.provider, Provider::Local);
        assert!(!reg.identitaet.email_verified);
        assert_eq!(reg.identitaet.rolle(), Rolle::User);

        let verifiziert = service
            .verifikation_einloesen(&reg.verifikation.token)
            .await
            .unwrap();
        assert!(verifiziert.email_verified);
    }

    #[tokio::test]
    async fn registrieren_ungueltige_eingaben() {
        let (service, repo, _) = service();
        for email in ["", "   ", "ohne-at", "@x.com", "a@", "a@b@c"] {
            assert!(matches!(
                service.registrieren(email, "secret123").await,
                Err(AuthError::EmailUngueltig(_))
            ));
        }
        assert!(matches!(
            service.registrieren("a@x.com", "kurz").await,
            Err(AuthError::PasswortUngueltig(_))
        ));
        assert_eq!(repo.anzahl(), 0);
    }

    #[tokio::test]
    async fn registrieren_doppelt() {
        let (service, _, _) = service();
        service.registrieren("alice@x.com", "secret123").await.unwrap();
        assert!(matches!(
            service.registrieren("ALICE@x.com", "secret456").await,
            Err(AuthError::EmailVergeben(_))
        ));
    }

    #[tokio::test]
    async fn registrieren_gegen_oauth_konto() {
        let (service, _, hasher) = service();
        service
            .abgleich()
            .oauth_identitaet_abgleichen("bob@x.com", Provider::Google)
            .await
            .unwrap();
        assert!(matches!(
            service.registrieren("bob@x.com", "secret123").await,
            Err(AuthError::ProviderKonflikt {
                vorhanden: Provider::Google
            })
        ));
        assert_eq!(hasher.aufrufe.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn lokal_anmelden_stellt_session_aus() {
        let (service, _, _) = service();
        let reg = service.registrieren("alice@x.com", "secret123").await.unwrap();
        let anmeldung = service.lokal_anmelden("alice@x.com", "secret123").await.unwrap();
        assert_eq!(anmeldung.identitaet.id, reg.identitaet.id);

        let principal = service.session_pruefen(&anmeldung.session.token).unwrap();
        assert_eq!(principal.id, reg.identitaet.id);
        assert_eq!(principal.provider, Provider::Local);

        let aktuell = service.aktuelle_identitaet(&principal).await.unwrap();
        assert_eq!(aktuell.email, "alice@x.com");
    }

    #[tokio::test]
    async fn flow_tokens_sind_keine_sessions() {
        let (service, _, _) = service();
        let reg = service.registrieren("alice@x.com", "secret123").await.unwrap();
        assert!(matches!(
            service.session_pruefen(&reg.verifikation.token),
            Err(AuthError::TokenUngueltig(_))
        ));
        let reset = service.reset_anfordern("alice@x.com").await.unwrap();
        assert!(service.session_pruefen(&reset.token).is_err());
    }

    #[tokio::test]
    async fn oauth_anmelden() {
        let (service, repo, _) = service();
        let profil = json!({ "email": "bob@gmail.com", "name": "Bob" });
        let erst = service.oauth_anmelden(&GoogleProvider, &profil).await.unwrap();
        let zweit = service.oauth_anmelden(&GoogleProvider, &profil).await.unwrap();
        assert_eq!(erst.identitaet.id, zweit.identitaet.id);
        assert_eq!(repo.anzahl(), 1);
        assert_eq!(erst.identitaet.profil.anzeigename.as_deref(), Some("Bob"));
    }

    #[tokio::test]
    async fn profil_aktualisieren_aendert_nur_profil() {
        let (service, _, _) = service();
        let reg = service.registrieren("alice@x.com", "secret123").await.unwrap();
        let id = reg.identitaet.id;

        let identitaet = service
            .profil_aktualisieren(
                id,
                ProfilUpdate {
                    anzeigename: Some("Alice".into()),
                    bild_url: Some("https://example.com/a.png".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(identitaet.profil.anzeigename.as_deref(), Some("Alice"));
        assert_eq!(identitaet.password_hash, reg.identitaet.password_hash);
        assert!(!identitaet.email_verified);

        let identitaet = service
            .profil_aktualisieren(
                id,
                ProfilUpdate {
                    anzeigename: Some(String::new()),
                    bild_url: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(identitaet.profil.anzeigename, None);
        assert_eq!(
            identitaet.profil.bild_url.as_deref(),
            Some("https://example.com/a.png")
        );

        let unveraendert = service
            .profil_aktualisieren(id, ProfilUpdate::default())
            .await
            .unwrap();
        assert_eq!(unveraendert, identitaet);
    }

    #[tokio::test]
    async fn aktuelle_identitaet_unbekannt() {
        let (service, _, _) = service();
        let principal = Principal {
            id: IdentitaetId::new(),
            email: "geist@x.com".into(),
            rolle: Rolle::User,
            provider: Provider::Local,
            laeuft_ab_am: Utc::now(),
        };
        assert!(matches!(
            service.aktuelle_identitaet(&principal).await,
            Err(AuthError::NichtGefunden(_))
        ));
    }
}
