//! gatekeep Server – Einstiegspunkt
//!
//! Laedt die Konfiguration, initialisiert das Logging und startet den Server.

use anyhow::Result;
use gatekeep_observability::logging_initialisieren;
use gatekeep_server::{config::ServerConfig, Server};

#[tokio::main]
async fn main() -> Result<()> {
    // Konfigurationsdatei-Pfad aus Umgebungsvariable oder Standard
    let config_pfad = std::env::var("GATEKEEP_CONFIG").unwrap_or_else(|_| "config.toml".into());

    // Konfiguration laden (Standardwerte falls Datei fehlt)
    let config = ServerConfig::laden(&config_pfad)?;

    // Logging initialisieren
    logging_initialisieren(&config.logging.level, &config.logging.format);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_pfad,
        "gatekeep Server wird initialisiert"
    );

    // Server starten
    let server = Server::neu(config);
    if let Err(e) = server.starten().await {
        tracing::error!(fehler = %e, "Server konnte nicht starten");
        return Err(e);
    }

    Ok(())
}
