//! Server-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte, sodass der Server ohne Konfigurationsdatei
//! startet. Einzige Ausnahme ist das Token-Geheimnis: ohne Geheimnis
//! (Datei oder `GK_JWT_SECRET`) bricht [`ServerConfig::validieren`] den
//! Start ab.

use chrono::Duration;
use gatekeep_auth::{Argon2Hasher, AuthResult, TokenLaufzeiten};
use gatekeep_core::GatekeepError;
use gatekeep_db::DatabaseConfig;
use serde::{Deserialize, Serialize};

/// Umgebungsvariable fuer das Token-Geheimnis
pub const ENV_JWT_SECRET: &str = "GK_JWT_SECRET";

/// Mindestlaenge des Token-Geheimnisses in Bytes
pub const MIN_SECRET_LAENGE: usize = 32;

/// Obergrenze fuer Token-Laufzeiten (10 Jahre)
pub const MAX_TTL_SEKUNDEN: i64 = 10 * 365 * 24 * 60 * 60;

/// Vollstaendige Server-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP-Einstellungen
    pub server: ServerEinstellungen,
    /// Datenbank-Einstellungen
    pub datenbank: DatenbankEinstellungen,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
    /// Tokens, Hashing, Cookie
    pub auth: AuthEinstellungen,
    /// OAuth-Zugangsdaten (nur fuer die vorgelagerte Handshake-Schicht)
    pub oauth: OAuthEinstellungen,
}

/// HTTP-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerEinstellungen {
    pub bind_adresse: String,
    pub port: u16,
    /// Entwicklungsmodus: Cookies ohne `Secure`, CORS offen
    pub entwicklung: bool,
    /// Basis-URL fuer Links in Reset- und Verifikations-Mails
    pub oeffentliche_url: String,
    /// CORS-Origins (leer = alle erlaubt, nur im Entwicklungsmodus)
    pub cors_origins: Vec<String>,
}

impl Default for ServerEinstellungen {
    fn default() -> Self {
        Self {
            bind_adresse: "0.0.0.0".into(),
            port: 8080,
            entwicklung: false,
            oeffentliche_url: "http://localhost:8080".into(),
            cors_origins: vec![],
        }
    }
}

/// Datenbank-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatenbankEinstellungen {
    /// Verbindungs-URL
    pub url: String,
    /// Maximale Verbindungspool-Groesse
    pub max_verbindungen: u32,
    /// WAL-Journal aktivieren
    pub sqlite_wal: bool,
}

impl Default for DatenbankEinstellungen {
    fn default() -> Self {
        let db = DatabaseConfig::default();
        Self {
            url: db.url,
            max_verbindungen: db.max_verbindungen,
            sqlite_wal: db.sqlite_wal,
        }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level oder Filter-Direktive
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

/// Auth-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthEinstellungen {
    /// HS256-Geheimnis; wird von `GK_JWT_SECRET` ueberschrieben
    pub jwt_secret: Option<String>,
    pub zugang_ttl_sekunden: i64,
    pub reset_ttl_sekunden: i64,
    pub verifikation_ttl_sekunden: i64,
    /// Argon2id-Speicher in KiB
    pub argon2_speicher_kib: u32,
    pub argon2_iterationen: u32,
    pub argon2_parallelitaet: u32,
    /// Name des Session-Cookies
    pub cookie_name: String,
}

impl Default for AuthEinstellungen {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            zugang_ttl_sekunden: 7 * 24 * 60 * 60,
            reset_ttl_sekunden: 15 * 60,
            verifikation_ttl_sekunden: 15 * 60,
            argon2_speicher_kib: 64 * 1024,
            argon2_iterationen: 3,
            argon2_parallelitaet: 1,
            cookie_name: "gatekeep_session".into(),
        }
    }
}

/// Zugangsdaten eines OAuth-Providers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthClient {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub callback_url: Option<String>,
}

impl OAuthClient {
    /// Alle drei Felder gesetzt
    pub fn ist_vollstaendig(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some() && self.callback_url.is_some()
    }

    fn ist_leer(&self) -> bool {
        self.client_id.is_none() && self.client_secret.is_none() && self.callback_url.is_none()
    }
}

/// OAuth-Einstellungen pro Provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthEinstellungen {
    pub google: OAuthClient,
    pub facebook: OAuthClient,
}

impl ServerConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    /// Umgebungsvariablen werden danach angewendet.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        let mut config = match std::fs::read_to_string(pfad) {
            Ok(inhalt) => toml::from_str::<Self>(&inhalt)
                .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    pfad = pfad,
                    "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
                );
                Self::default()
            }
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
                ))
            }
        };
        config.umgebung_anwenden(std::env::var(ENV_JWT_SECRET).ok());
        Ok(config)
    }

    /// Ueberschreibt das Geheimnis aus der Umgebung (falls gesetzt)
    pub fn umgebung_anwenden(&mut self, jwt_secret: Option<String>) {
        if let Some(secret) = jwt_secret.filter(|s| !s.is_empty()) {
            self.auth.jwt_secret = Some(secret);
        }
    }

    /// Prueft die Konfiguration vor dem Start
    ///
    /// Jeder Fehler hier ist fatal: der Prozess startet nicht.
    pub fn validieren(&self) -> Result<(), GatekeepError> {
        let secret = self.auth.jwt_secret.as_deref().unwrap_or_default();
        if secret.is_empty() {
            return Err(GatekeepError::konfiguration(format!(
                "Kein Token-Geheimnis konfiguriert ([auth] jwt_secret oder {ENV_JWT_SECRET})"
            )));
        }
        if secret.len() < MIN_SECRET_LAENGE {
            return Err(GatekeepError::konfiguration(format!(
                "Token-Geheimnis zu kurz (mindestens {MIN_SECRET_LAENGE} Bytes)"
            )));
        }

        for (name, wert) in [
            ("zugang_ttl_sekunden", self.auth.zugang_ttl_sekunden),
            ("reset_ttl_sekunden", self.auth.reset_ttl_sekunden),
            ("verifikation_ttl_sekunden", self.auth.verifikation_ttl_sekunden),
        ] {
            if wert <= 0 {
                return Err(GatekeepError::konfiguration(format!(
                    "[auth] {name} muss positiv sein"
                )));
            }
            if wert > MAX_TTL_SEKUNDEN {
                return Err(GatekeepError::konfiguration(format!(
                    "[auth] {name} zu gross (hoechstens {MAX_TTL_SEKUNDEN})"
                )));
            }
        }

        if self.auth.cookie_name.is_empty()
            || !self
                .auth
                .cookie_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(GatekeepError::konfiguration(format!(
                "Ungueltiger Cookie-Name: '{}'",
                self.auth.cookie_name
            )));
        }

        for (name, client) in [("google", &self.oauth.google), ("facebook", &self.oauth.facebook)] {
            if !client.ist_leer() && !client.ist_vollstaendig() {
                return Err(GatekeepError::konfiguration(format!(
                    "[oauth.{name}] unvollstaendig: client_id, client_secret und callback_url angeben"
                )));
            }
        }

        self.hasher()
            .map_err(|e| GatekeepError::konfiguration(e.to_string()))?;
        Ok(())
    }

    /// Geheimnis als Bytes (leer wenn nicht konfiguriert)
    pub fn jwt_secret(&self) -> &[u8] {
        self.auth
            .jwt_secret
            .as_deref()
            .map(str::as_bytes)
            .unwrap_or_default()
    }

    /// Laufzeiten der Tokens, begrenzt auf 0 bis [`MAX_TTL_SEKUNDEN`]
    pub fn token_laufzeiten(&self) -> TokenLaufzeiten {
        let laufzeit = |sekunden: i64| Duration::seconds(sekunden.clamp(0, MAX_TTL_SEKUNDEN));
        TokenLaufzeiten {
            zugang: laufzeit(self.auth.zugang_ttl_sekunden),
            passwort_reset: laufzeit(self.auth.reset_ttl_sekunden),
            email_verifikation: laufzeit(self.auth.verifikation_ttl_sekunden),
        }
    }

    /// Argon2id-Hasher mit den konfigurierten Kosten
    pub fn hasher(&self) -> AuthResult<Argon2Hasher> {
        Argon2Hasher::mit_parametern(
            self.auth.argon2_speicher_kib,
            self.auth.argon2_iterationen,
            self.auth.argon2_parallelitaet,
        )
    }

    /// Datenbank-Konfiguration fuer den Pool
    pub fn datenbank_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.datenbank.url.clone(),
            max_verbindungen: self.datenbank.max_verbindungen,
            sqlite_wal: self.datenbank.sqlite_wal,
        }
    }

    /// Gibt die vollstaendige Bind-Adresse fuer HTTP zurueck
    pub fn bind_adresse(&self) -> String {
        format!("{}:{}", self.server.bind_adresse, self.server.port)
    }
}
