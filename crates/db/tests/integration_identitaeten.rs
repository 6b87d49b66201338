//! Integration-Tests fuer IdentitaetRepository (In-Memory SQLite)

use gatekeep_core::{IdentitaetId, Provider, Rolle};
use gatekeep_db::{
    DbError, IdentitaetRepository, IdentitaetUpdate, NeueIdentitaet, Profil, SqliteDb,
};

async fn db() -> SqliteDb {
    SqliteDb::in_memory()
        .await
        .expect("In-Memory DB konnte nicht erstellt werden")
}

#[tokio::test]
async fn lokale_identitaet_erstellen_und_laden() {
    let db = db().await;

    let identitaet = db
        .create(NeueIdentitaet::lokal("alice@x.com", "hash_alice"))
        .await
        .expect("Identitaet erstellen fehlgeschlagen");

    assert_eq!(identitaet.email, "alice@x.com");
    assert_eq!(identitaet.provider, Provider::Local);
    assert!(!identitaet.email_verified);
    assert_eq!(identitaet.rollen, vec![Rolle::User]);

    let geladen = db
        .get_by_id(identitaet.id)
        .await
        .expect("get_by_id fehlgeschlagen")
        .expect("Identitaet sollte gefunden werden");

    assert_eq!(geladen.id, identitaet.id);
    assert_eq!(geladen.password_hash.as_deref(), Some("hash_alice"));
}

#[tokio::test]
async fn oauth_identitaet_ohne_passwort() {
    let db = db().await;

    let profil = Profil {
        anzeigename: Some("Bob".into()),
        bild_url: Some("https://example.com/bob.png".into()),
    };
    let identitaet = db
        .create(NeueIdentitaet::oauth("bob@x.com", Provider::Google, profil.clone()))
        .await
        .unwrap();

    let geladen = db.get_by_email("bob@x.com").await.unwrap().unwrap();
    assert_eq!(geladen.id, identitaet.id);
    assert_eq!(geladen.provider, Provider::Google);
    assert!(geladen.password_hash.is_none());
    assert!(geladen.email_verified);
    assert_eq!(geladen.profil, profil);

    assert!(db.get_by_email("unbekannt@x.com").await.unwrap().is_none());
}

#[tokio::test]
async fn email_ist_eindeutig() {
    let db = db().await;

    db.create(NeueIdentitaet::lokal("charlie@x.com", "hash1"))
        .await
        .unwrap();

    let err = db
        .create(NeueIdentitaet::oauth(
            "charlie@x.com",
            Provider::Facebook,
            Profil::default(),
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, DbError::EmailVergeben(_)));
    assert!(err.ist_eindeutigkeit());
}

#[tokio::test]
async fn passwort_hash_ersetzen() {
    let db = db().await;

    let identitaet = db
        .create(NeueIdentitaet::lokal("dave@x.com", "alt_hash"))
        .await
        .unwrap();

    let aktualisiert = db
        .update(
            identitaet.id,
            IdentitaetUpdate {
                password_hash: Some("neuer_hash".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(aktualisiert.password_hash.as_deref(), Some("neuer_hash"));
    assert_eq!(aktualisiert.email, "dave@x.com");
    assert!(aktualisiert.updated_at >= identitaet.updated_at);
}

#[tokio::test]
async fn email_verifizieren_und_profil_aendern() {
    let db = db().await;

    let identitaet = db
        .create(NeueIdentitaet::lokal("eve@x.com", "hash"))
        .await
        .unwrap();

    let aktualisiert = db
        .update(
            identitaet.id,
            IdentitaetUpdate {
                email_verified: Some(true),
                anzeigename: Some(Some("Eve".into())),
                rollen: Some(vec![Rolle::User, Rolle::Admin]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(aktualisiert.email_verified);
    assert_eq!(aktualisiert.profil.anzeigename.as_deref(), Some("Eve"));
    assert_eq!(aktualisiert.rolle(), Rolle::Admin);

    // Name wieder entfernen
    let ohne_name = db
        .update(
            identitaet.id,
            IdentitaetUpdate {
                anzeigename: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(ohne_name.profil.anzeigename.is_none());
    assert!(ohne_name.email_verified);
}

#[tokio::test]
async fn oauth_konto_lehnt_passwort_hash_ab() {
    let db = db().await;

    let identitaet = db
        .create(NeueIdentitaet::oauth("fb@x.com", Provider::Facebook, Profil::default()))
        .await
        .unwrap();

    let err = db
        .update(
            identitaet.id,
            IdentitaetUpdate {
                password_hash: Some("hash".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DbError::UngueltigeDaten(_)));
}

#[tokio::test]
async fn update_unbekannte_id() {
    let db = db().await;

    let err = db
        .update(
            IdentitaetId::new(),
            IdentitaetUpdate {
                email_verified: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::NichtGefunden(_)));

    let err = db
        .update(IdentitaetId::new(), IdentitaetUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::NichtGefunden(_)));
}

#[tokio::test]
async fn health_ping() {
    let db = db().await;
    assert!(db.ping().await);
}
