//! gatekeep-server – Bibliotheks-Root
//!
//! Deklariert alle Server-Module und stellt den oeffentlichen Einstiegspunkt
//! fuer Integrationstests bereit.

pub mod config;
pub mod rest;

use std::sync::Arc;

use anyhow::Result;
use axum::http::{HeaderValue, Method};
use axum::{middleware, Router};
use config::ServerConfig;
use gatekeep_auth::{AuthService, TokenCodec};
use gatekeep_core::GatekeepError;
use gatekeep_db::SqliteDb;
use gatekeep_observability::{
    health_router, request_timing_layer, timing_middleware, DbPing, HealthState, PingFuture,
};
use rest::cookie::CookieEinstellungen;
use rest::zustellung::{LinkZustellung, LogZustellung};
use rest::{routes::api_router, AppState};
use tower_http::cors::CorsLayer;

/// Health-Probe gegen den SQLite-Pool
struct SqlitePing(SqliteDb);

impl DbPing for SqlitePing {
    fn ping(&self) -> PingFuture<'_> {
        Box::pin(self.0.ping())
    }
}

/// Verdrahtet Auth-Kern und REST-State aus Konfiguration und Datenbank
///
/// Schlaegt mit einem Konfigurationsfehler fehl, wenn Geheimnis oder
/// Hashing-Parameter unbrauchbar sind.
pub fn app_state_bauen(
    config: &ServerConfig,
    db: SqliteDb,
    zustellung: Arc<dyn LinkZustellung>,
) -> Result<AppState, GatekeepError> {
    let codec = TokenCodec::neu(config.jwt_secret())
        .map_err(|e| GatekeepError::konfiguration(e.to_string()))?;
    let hasher = config
        .hasher()
        .map_err(|e| GatekeepError::konfiguration(e.to_string()))?;

    let auth = AuthService::neu(
        Arc::new(db),
        Arc::new(hasher),
        Arc::new(codec),
        config.token_laufzeiten(),
    );

    Ok(AppState::neu(
        Arc::new(auth),
        CookieEinstellungen {
            name: config.auth.cookie_name.clone(),
            secure: !config.server.entwicklung,
        },
        zustellung,
        &config.server.oeffentliche_url,
    ))
}

/// Baut den vollstaendigen Router (API + Health + Middleware)
pub fn app_bauen(config: &ServerConfig, state: AppState, db: SqliteDb) -> Router {
    let cors = if config.server.cors_origins.is_empty() {
        if config.server.entwicklung {
            CorsLayer::permissive()
        } else {
            CorsLayer::new()
        }
    } else {
        let origins: Vec<HeaderValue> = config
            .server
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
            .allow_headers([
                axum::http::header::AUTHORIZATION,
                axum::http::header::CONTENT_TYPE,
            ])
            .allow_credentials(true)
    };

    api_router()
        .with_state(state)
        .merge(health_router(HealthState::neu(Arc::new(SqlitePing(db)))))
        .layer(middleware::from_fn(timing_middleware))
        .layer(request_timing_layer())
        .layer(cors)
}

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Startet den Server und laeuft bis zum Shutdown-Signal
    ///
    /// Reihenfolge:
    /// 1. Konfiguration validieren (fatal bei Fehlern)
    /// 2. Datenbankverbindung herstellen, Migrationen ausfuehren
    /// 3. Auth-Kern verdrahten
    /// 4. REST-API starten
    /// 5. Auf Ctrl-C warten
    pub async fn starten(self) -> Result<()> {
        self.config.validieren()?;

        let db = SqliteDb::oeffnen(&self.config.datenbank_config()).await?;
        let state = app_state_bauen(&self.config, db.clone(), Arc::new(LogZustellung))?;
        let app = app_bauen(&self.config, state, db);

        let adresse = self.config.bind_adresse();
        let listener = tokio::net::TcpListener::bind(&adresse).await?;
        tracing::info!(
            adresse = %adresse,
            entwicklung = self.config.server.entwicklung,
            "REST-API gestartet"
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        tracing::info!("Server beendet");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(fehler = %e, "Ctrl-C-Handler konnte nicht installiert werden");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown-Signal empfangen, Server wird beendet");
}
