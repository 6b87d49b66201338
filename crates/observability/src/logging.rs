//! Structured Logging Setup via tracing-subscriber
//!
//! Konfigurierbar per Umgebungsvariable (hat Vorrang vor der Konfigurationsdatei):
//! - `GK_LOG_LEVEL`: Filter-Direktive (z.B. `info`, `gatekeep_auth=debug`), Standard: info
//! - `GK_LOG_FORMAT`: Format (text/json), Standard: text

use std::str::FromStr;

use tracing_subscriber::{fmt, EnvFilter};

pub const ENV_LOG_LEVEL: &str = "GK_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "GK_LOG_FORMAT";

/// Ausgabeformat der Logs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            andere => Err(format!("Unbekanntes Log-Format: '{andere}'")),
        }
    }
}

/// Initialisiert das Logging-System.
///
/// Liest `GK_LOG_LEVEL` und `GK_LOG_FORMAT` aus der Umgebung und faellt auf
/// die uebergebenen Werte aus der Konfiguration zurueck.
pub fn logging_initialisieren(level: &str, format: &str) {
    let filter = filter_aufloesen(std::env::var(ENV_LOG_LEVEL).ok(), level);
    let format = format_aufloesen(std::env::var(ENV_LOG_FORMAT).ok(), format);

    match format {
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_current_span(true)
                .init();
        }
        LogFormat::Text => {
            fmt().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Waehlt den Filter: Umgebung, dann Konfiguration, sonst `info`
fn filter_aufloesen(aus_env: Option<String>, konfiguriert: &str) -> EnvFilter {
    aus_env
        .and_then(|l| EnvFilter::try_new(l).ok())
        .or_else(|| EnvFilter::try_new(konfiguriert).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

/// Waehlt das Format: Umgebung, dann Konfiguration, sonst Text
fn format_aufloesen(aus_env: Option<String>, konfiguriert: &str) -> LogFormat {
    aus_env
        .and_then(|f| f.parse().ok())
        .or_else(|| konfiguriert.parse().ok())
        .unwrap_or_default()
}

/// Validiert ob ein Log-Level-String gueltig ist.
pub fn log_level_gueltig(level: &str) -> bool {
    matches!(level, "trace" | "debug" | "info" | "warn" | "error")
}
