//! SQLite-Implementierung des IdentitaetRepository

use chrono::Utc;
use gatekeep_core::{IdentitaetId, Provider, Rolle};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::models::{IdentitaetRecord, IdentitaetUpdate, NeueIdentitaet, Profil};
use crate::repository::IdentitaetRepository;
use crate::sqlite::pool::SqliteDb;

const SPALTEN: &str = "id, email, password_hash, provider, email_verified, rollen, \
                       anzeigename, bild_url, created_at, updated_at";

impl IdentitaetRepository for SqliteDb {
    async fn get_by_email(&self, email: &str) -> DbResult<Option<IdentitaetRecord>> {
        let sql = format!("SELECT {SPALTEN} FROM identitaeten WHERE email = ?");
        let row = sqlx::query(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_to_identitaet(&r)).transpose()
    }

    async fn get_by_id(&self, id: IdentitaetId) -> DbResult<Option<IdentitaetRecord>> {
        let sql = format!("SELECT {SPALTEN} FROM identitaeten WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_to_identitaet(&r)).transpose()
    }

    async fn create(&self, data: NeueIdentitaet<'_>) -> DbResult<IdentitaetRecord> {
        data.pruefen()?;

        let id = IdentitaetId::new();
        let now = Utc::now();
        let now_str = now.to_rfc3339();
        let rollen_json = serde_json::to_string(&data.rollen)?;

        sqlx::query(
            "INSERT INTO identitaeten
                (id, email, password_hash, provider, email_verified, rollen,
                 anzeigename, bild_url, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.provider.als_str())
        .bind(data.email_verified as i64)
        .bind(&rollen_json)
        .bind(data.profil.anzeigename.as_deref())
        .bind(data.profil.bild_url.as_deref())
        .bind(&now_str)
        .bind(&now_str)
        .execute(&self.pool)
        .await
        .map_err(|e| schreibfehler(e, data.email))?;

        tracing::debug!(id = %id, provider = %data.provider, "Identitaet angelegt");

        Ok(IdentitaetRecord {
            id,
            email: data.email.to_string(),
            password_hash: data.password_hash.map(str::to_string),
            provider: data.provider,
            email_verified: data.email_verified,
            rollen: data.rollen,
            profil: data.profil,
            created_at: now,
            updated_at: now,
        })
    }

    async fn update(
        &self,
        id: IdentitaetId,
        data: IdentitaetUpdate,
    ) -> DbResult<IdentitaetRecord> {
        if data.ist_leer() {
            return self
                .get_by_id(id)
                .await?
                .ok_or_else(|| DbError::nicht_gefunden(format!("Identitaet {id}")));
        }

        // Dynamisches UPDATE – nur gesetzte Felder aendern
        let mut sets: Vec<&str> = Vec::new();
        if data.password_hash.is_some() {
            sets.push("password_hash = ?");
        }
        if data.email_verified.is_some() {
            sets.push("email_verified = ?");
        }
        if data.rollen.is_some() {
            sets.push("rollen = ?");
        }
        if data.anzeigename.is_some() {
            sets.push("anzeigename = ?");
        }
        if data.bild_url.is_some() {
            sets.push("bild_url = ?");
        }
        sets.push("updated_at = ?");

        let sql = format!("UPDATE identitaeten SET {} WHERE id = ?", sets.join(", "));
        let mut q = sqlx::query(&sql);

        if let Some(ref v) = data.password_hash {
            q = q.bind(v);
        }
        if let Some(v) = data.email_verified {
            q = q.bind(v as i64);
        }
        if let Some(ref v) = data.rollen {
            q = q.bind(serde_json::to_string(v)?);
        }
        if let Some(ref v) = data.anzeigename {
            q = q.bind(v.clone());
        }
        if let Some(ref v) = data.bild_url {
            q = q.bind(v.clone());
        }
        q = q.bind(Utc::now().to_rfc3339());
        q = q.bind(id.to_string());

        let affected = q
            .execute(&self.pool)
            .await
            .map_err(|e| schreibfehler(e, &id.to_string()))?
            .rows_affected();
        if affected == 0 {
            return Err(DbError::nicht_gefunden(format!("Identitaet {id}")));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::intern("Identitaet nach Update nicht gefunden"))
    }
}

/// Ordnet Constraint-Verletzungen den fachlichen Fehlern zu
fn schreibfehler(e: sqlx::Error, kontext: &str) -> DbError {
    let msg = e.to_string();
    if msg.contains("UNIQUE") || msg.contains("unique") {
        DbError::EmailVergeben(kontext.to_string())
    } else if msg.contains("CHECK") {
        DbError::ungueltige_daten(format!("Constraint verletzt fuer '{kontext}': {msg}"))
    } else {
        DbError::Sqlx(e)
    }
}

fn row_to_identitaet(row: &sqlx::sqlite::SqliteRow) -> DbResult<IdentitaetRecord> {
    use sqlx::Row as _;

    let id_str: String = row.try_get("id")?;
    let id = Uuid::parse_str(&id_str)
        .map(IdentitaetId)
        .map_err(|e| DbError::intern(format!("Ungueltige UUID '{id_str}': {e}")))?;

    let provider_str: String = row.try_get("provider")?;
    let provider: Provider = provider_str
        .parse()
        .map_err(|e| DbError::intern(format!("{e}")))?;

    let rollen_str: String = row.try_get("rollen")?;
    let rollen: Vec<Rolle> = serde_json::from_str(&rollen_str)?;

    let created_at = zeitpunkt(row, "created_at")?;
    let updated_at = zeitpunkt(row, "updated_at")?;
    let email_verified: i64 = row.try_get("email_verified")?;

    Ok(IdentitaetRecord {
        id,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        provider,
        email_verified: email_verified != 0,
        rollen,
        profil: Profil {
            anzeigename: row.try_get("anzeigename")?,
            bild_url: row.try_get("bild_url")?,
        },
        created_at,
        updated_at,
    })
}

fn zeitpunkt(row: &sqlx::sqlite::SqliteRow, spalte: &str) -> DbResult<chrono::DateTime<Utc>> {
    use sqlx::Row as _;

    let wert: String = row.try_get(spalte)?;
    chrono::DateTime::parse_from_rfc3339(&wert)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::intern(format!("Ungueltige {spalte} '{wert}': {e}")))
}
