//! End-to-End-Szenarien fuer den Auth-Kern (In-Memory SQLite, feste Uhr)

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, Utc};
use gatekeep_auth::{
    AuthError, AuthService, Argon2Hasher, FacebookProvider, FesteUhr, FlowZustand,
    GoogleProvider, TokenCodec, TokenFehler, TokenLaufzeiten,
};
use gatekeep_core::Provider;
use gatekeep_db::{IdentitaetRepository, NeueIdentitaet, Profil, SqliteDb};
use serde_json::json;

struct Umgebung {
    service: AuthService<SqliteDb, Argon2Hasher>,
    db: Arc<SqliteDb>,
    uhr: Arc<FesteUhr>,
}

async fn umgebung() -> Umgebung {
    let db = Arc::new(
        SqliteDb::in_memory()
            .await
            .expect("In-Memory DB konnte nicht erstellt werden"),
    );
    let uhr = Arc::new(FesteUhr::neu(Utc::now()));
    let codec = TokenCodec::neu(b"szenario-geheimnis-0123456789abcdef")
        .expect("Codec")
        .mit_uhr(uhr.clone());
    // Niedrige Kosten, damit die Tests schnell bleiben
    let hasher = Arc::new(Argon2Hasher::mit_parametern(1024, 1, 1).expect("Parameter"));
    let service = AuthService::neu(
        db.clone(),
        hasher,
        Arc::new(codec),
        TokenLaufzeiten::default(),
    );
    Umgebung { service, db, uhr }
}

#[tokio::test]
async fn szenario_registrieren_und_anmelden() {
    let u = umgebung().await;
    u.service
        .registrieren("a@x.com", "secret123")
        .await
        .expect("Registrierung");

    let identitaet = u
        .service
        .pruefer()
        .lokale_anmeldung_pruefen("a@x.com", "secret123")
        .await
        .expect("Login mit korrektem Passwort");
    assert_eq!(identitaet.email, "a@x.com");

    let e = u
        .service
        .pruefer()
        .lokale_anmeldung_pruefen("a@x.com", "wrong")
        .await
        .unwrap_err();
    assert!(matches!(e, AuthError::FalschesPasswort));
}

#[tokio::test]
async fn szenario_oauth_erstanmeldung() {
    let u = umgebung().await;
    let identitaet = u
        .service
        .abgleich()
        .oauth_identitaet_abgleichen("b@x.com", Provider::Google)
        .await
        .expect("Abgleich");

    assert_eq!(identitaet.provider, Provider::Google);
    assert!(identitaet.email_verified);
    assert!(identitaet.password_hash.is_none());

    let gespeichert = u.db.get_by_email("b@x.com").await.unwrap().unwrap();
    assert_eq!(gespeichert.id, identitaet.id);
    assert!(gespeichert.password_hash.is_none());
}

#[tokio::test]
async fn szenario_passwort_reset() {
    let u = umgebung().await;
    u.service.registrieren("a@x.com", "secret123").await.unwrap();

    let token = u.service.reset_anfordern("a@x.com").await.expect("Reset-Token");
    u.service
        .reset_einloesen(&token.token, "newpass1")
        .await
        .expect("Reset einloesen");

    assert!(u
        .service
        .pruefer()
        .lokale_anmeldung_pruefen("a@x.com", "newpass1")
        .await
        .is_ok());
    assert!(matches!(
        u.service
            .pruefer()
            .lokale_anmeldung_pruefen("a@x.com", "secret123")
            .await,
        Err(AuthError::FalschesPasswort)
    ));
}

#[tokio::test]
async fn szenario_abgelaufene_verifikation() {
    let u = umgebung().await;
    let reg = u.service.registrieren("a@x.com", "secret123").await.unwrap();

    u.uhr.vorstellen(Duration::minutes(15));

    let e = u
        .service
        .verifikation_einloesen(&reg.verifikation.token)
        .await
        .unwrap_err();
    assert_eq!(e.token_grund(), Some(TokenFehler::Abgelaufen));
    assert_eq!(
        u.service
            .email_verifikation()
            .status(&reg.verifikation.token)
            .await
            .unwrap(),
        FlowZustand::Abgelaufen
    );

    let gespeichert = u.db.get_by_id(reg.identitaet.id).await.unwrap().unwrap();
    assert!(!gespeichert.email_verified);
}

#[tokio::test]
async fn lokale_anmeldung_genau_bei_passendem_hash() {
    let u = umgebung().await;
    let passwoerter = ["secret123", "n0ch-eins!", "Gross-Klein"];
    for (i, pw) in passwoerter.iter().enumerate() {
        u.service
            .registrieren(&format!("user{i}@x.com"), pw)
            .await
            .unwrap();
    }

    for (i, _) in passwoerter.iter().enumerate() {
        for (j, versuch) in passwoerter.iter().enumerate() {
            let ergebnis = u
                .service
                .pruefer()
                .lokale_anmeldung_pruefen(&format!("user{i}@x.com"), versuch)
                .await;
            assert_eq!(ergebnis.is_ok(), i == j, "user{i} mit Passwort {j}");
        }
    }
}

#[tokio::test]
async fn oauth_konto_kann_sich_nicht_mit_passwort_anmelden() {
    let u = umgebung().await;
    u.service
        .oauth_anmelden(&FacebookProvider, &json!({ "email": "c@x.com", "name": "C" }))
        .await
        .unwrap();

    let e = u
        .service
        .lokal_anmelden("c@x.com", "irgendwas1")
        .await
        .unwrap_err();
    assert!(matches!(
        e,
        AuthError::FalscherProvider {
            provider: Provider::Facebook
        }
    ));
    assert!(e.ist_anmeldefehler());

    assert!(matches!(
        u.service.reset_anfordern("c@x.com").await,
        Err(AuthError::FalscherProvider { .. })
    ));
}

#[tokio::test]
async fn provider_konflikt_veraendert_nichts() {
    let u = umgebung().await;
    let reg = u.service.registrieren("a@x.com", "secret123").await.unwrap();

    let e = u
        .service
        .oauth_anmelden(&GoogleProvider, &json!({ "email": "A@x.com" }))
        .await
        .unwrap_err();
    assert!(matches!(
        e,
        AuthError::ProviderKonflikt {
            vorhanden: Provider::Local
        }
    ));

    let gespeichert = u.db.get_by_id(reg.identitaet.id).await.unwrap().unwrap();
    assert_eq!(gespeichert, reg.identitaet);
}

#[tokio::test]
async fn paralleler_abgleich_erzeugt_ein_konto() {
    let u = umgebung().await;
    let service = Arc::new(u.service);

    let mut aufgaben = Vec::new();
    for _ in 0..8 {
        let service = service.clone();
        aufgaben.push(tokio::spawn(async move {
            service
                .abgleich()
                .oauth_identitaet_abgleichen("d@x.com", Provider::Google)
                .await
        }));
    }

    let mut ids = HashSet::new();
    for aufgabe in aufgaben {
        ids.insert(aufgabe.await.unwrap().expect("Abgleich").id);
    }
    assert_eq!(ids.len(), 1);

    // Ein weiteres Anlegen scheitert an der eindeutigen E-Mail
    assert!(u
        .db
        .create(NeueIdentitaet::oauth("d@x.com", Provider::Google, Profil::default()))
        .await
        .is_err());
}

#[tokio::test]
async fn session_nach_login_und_ablauf() {
    let u = umgebung().await;
    u.service.registrieren("a@x.com", "secret123").await.unwrap();
    let anmeldung = u.service.lokal_anmelden("a@x.com", "secret123").await.unwrap();

    let principal = u.service.session_pruefen(&anmeldung.session.token).unwrap();
    assert_eq!(principal.email, "a@x.com");

    u.uhr.vorstellen(Duration::days(7));
    assert!(matches!(
        u.service.session_pruefen(&anmeldung.session.token),
        Err(AuthError::TokenUngueltig(TokenFehler::Abgelaufen))
    ));
}
