//! Request-Timing Middleware fuer Axum
//!
//! Misst die Antwortzeit jeder HTTP-Anfrage und protokolliert sie als
//! strukturiertes Log-Event.

use axum::{
    body::Body,
    http::{Request, Response},
    middleware::Next,
};
use std::time::Instant;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{MakeSpan, TraceLayer};
use tracing::Span;

/// Baut HTTP-Spans ohne vollstaendige URI
///
/// Der Standard-Span von tower-http enthaelt die URI samt Token; hier
/// landet nur der gekuerzte Pfad im Span.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaskierterSpan;

impl<B> MakeSpan<B> for MaskierterSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        tracing::debug_span!(
            "request",
            method = %request.method(),
            path = %pfad_fuer_log(request.uri().path()),
            version = ?request.version(),
        )
    }
}

/// Tracing-Layer fuer HTTP-Spans
pub fn request_timing_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>, MaskierterSpan> {
    TraceLayer::new_for_http().make_span_with(MaskierterSpan)
}

/// Axum-Middleware-Funktion: misst Antwortzeit und loggt strukturiert.
///
/// Der Pfad wird ohne Query geloggt; Tokens in Verifikations-Links stehen
/// im Pfad und werden gekuerzt.
pub async fn timing_middleware(req: Request<Body>, next: Next) -> Response<Body> {
    let methode = req.method().to_string();
    let pfad = pfad_fuer_log(req.uri().path());
    let start = Instant::now();

    let response = next.run(req).await;

    tracing::info!(
        method = %methode,
        path = %pfad,
        status = response.status().as_u16(),
        duration_ms = start.elapsed().as_millis() as u64,
        "HTTP-Anfrage abgeschlossen"
    );

    response
}

/// Ersetzt lange Pfadsegmente (Tokens) durch einen Platzhalter
fn pfad_fuer_log(pfad: &str) -> String {
    pfad.split('/')
        .map(|segment| if segment.len() > 40 { ":token" } else { segment })
        .collect::<Vec<_>>()
        .join("/")
}
