//! # gatekeep-observability
//!
//! Observability-Crate fuer gatekeep:
//! - Health-Check-Endpunkt (`/health`) mit Datenbank-Probe
//! - Structured Logging (Text oder JSON) via tracing-subscriber
//! - Request-Timing Middleware

pub mod health;
pub mod logging;
pub mod middleware;

pub use health::{health_router, DbPing, HealthResponse, HealthState, HealthStatus, PingFuture};
pub use logging::{logging_initialisieren, LogFormat};
pub use middleware::{request_timing_layer, timing_middleware, MaskierterSpan};
