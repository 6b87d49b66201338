//! Health-Check-Endpunkt fuer gatekeep
//!
//! Endpoint: `GET /health`
//! Response: JSON mit Status, Version, Uptime und DB-Verbindungsstatus

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

/// Future einer Datenbank-Probe
pub type PingFuture<'a> = Pin<Box<dyn Future<Output = bool> + Send + 'a>>;

/// Prueft die Erreichbarkeit der Datenbank
pub trait DbPing: Send + Sync + 'static {
    fn ping(&self) -> PingFuture<'_>;
}

/// Status des Health-Checks
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

/// Antwort des Health-Check-Endpunkts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub db_connected: bool,
}

/// Geteilter Zustand fuer den Health-Check-Handler
#[derive(Clone)]
pub struct HealthState {
    start_time: Arc<Instant>,
    db: Arc<dyn DbPing>,
}

impl HealthState {
    pub fn neu(db: Arc<dyn DbPing>) -> Self {
        Self {
            start_time: Arc::new(Instant::now()),
            db,
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Fuehrt die Probe aus und baut die Antwort
    pub async fn pruefen(&self) -> HealthResponse {
        let db_connected = self.db.ping().await;
        if !db_connected {
            tracing::warn!("Health-Check: Datenbank nicht erreichbar");
        }
        HealthResponse {
            status: if db_connected {
                HealthStatus::Healthy
            } else {
                HealthStatus::Degraded
            },
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.uptime_seconds(),
            db_connected,
        }
    }
}

/// Axum-Router fuer den `/health`-Endpunkt
pub fn health_router(state: HealthState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(state)
}

/// `GET /health` – gibt den Serverstatus zurueck
///
/// Auch `degraded` antwortet mit 200, damit Probes nicht fehlschlagen.
async fn health_handler(State(state): State<HealthState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.pruefen().await))
}
