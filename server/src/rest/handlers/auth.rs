//! REST-Handler fuer Registrierung, Login und die Link-Flows

use axum::{
    extract::{Path, State},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use gatekeep_auth::{email_normalisieren, AuthError};
use gatekeep_db::IdentitaetRecord;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::rest::error::RestError;
use crate::rest::zustellung::LinkArt;
use crate::rest::AppState;

#[derive(Debug, Deserialize)]
pub struct AnmeldedatenBody {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginAntwort {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: IdentitaetRecord,
}

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<AnmeldedatenBody>,
) -> Result<Response, RestError> {
    let reg = state.auth.registrieren(&body.email, &body.password).await?;

    let link = format!(
        "{}/auth/verify-email/{}",
        state.oeffentliche_url, reg.verifikation.token
    );
    state
        .zustellung
        .zustellen(LinkArt::EmailVerifikation, &reg.identitaet.email, &link)
        .await;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Registrierung erfolgreich. Bitte E-Mail bestaetigen.",
            "user": reg.identitaet,
        })),
    )
        .into_response())
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<AnmeldedatenBody>,
) -> Result<Response, RestError> {
    let anmeldung = state.auth.lokal_anmelden(&body.email, &body.password).await?;

    let mut headers = HeaderMap::new();
    if let Some(cookie) = state
        .cookie
        .session_cookie(&anmeldung.session.token, anmeldung.session.max_age_sekunden)
    {
        headers.insert(SET_COOKIE, cookie);
    }

    let antwort = LoginAntwort {
        token: anmeldung.session.token,
        expires_at: anmeldung.session.laeuft_ab_am,
        user: anmeldung.identitaet,
    };
    Ok((StatusCode::OK, headers, Json(antwort)).into_response())
}

/// POST /auth/logout
///
/// Sessions sind zustandslos; es wird nur das Cookie geloescht.
pub async fn logout(State(state): State<AppState>) -> Response {
    let mut headers = HeaderMap::new();
    if let Some(cookie) = state.cookie.cookie_loeschen() {
        headers.insert(SET_COOKIE, cookie);
    }
    (StatusCode::NO_CONTENT, headers).into_response()
}

#[derive(Debug, Deserialize)]
pub struct PasswortVergessenBody {
    pub email: String,
}

/// POST /auth/forgot-password
///
/// Antwortet immer gleich, egal ob ein lokales Konto existiert.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<PasswortVergessenBody>,
) -> Result<Response, RestError> {
    let email = email_normalisieren(&body.email);
    match state.auth.reset_anfordern(&email).await {
        Ok(token) => {
            let link = format!(
                "{}/reset-password?token={}",
                state.oeffentliche_url, token.token
            );
            state
                .zustellung
                .zustellen(LinkArt::PasswortReset, &email, &link)
                .await;
        }
        Err(e @ (AuthError::NichtGefunden(_) | AuthError::FalscherProvider { .. })) => {
            tracing::debug!(fehler = %e, "Kein Reset-Link versendet");
        }
        Err(e) => return Err(e.into()),
    }

    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Falls ein Konto mit Passwort existiert, wurde ein Link versendet."
        })),
    )
        .into_response())
}

#[derive(Debug, Deserialize)]
pub struct PasswortResetBody {
    pub token: String,
    pub password: String,
}

/// POST /auth/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<PasswortResetBody>,
) -> Result<Response, RestError> {
    state
        .auth
        .reset_einloesen(&body.token, &body.password)
        .await
        .map_err(RestError::fuer_link)?;

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Passwort wurde geaendert." })),
    )
        .into_response())
}

/// GET /auth/verify-email/:token
pub async fn verify_email(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Response, RestError> {
    let identitaet = state
        .auth
        .verifikation_einloesen(&token)
        .await
        .map_err(RestError::fuer_link)?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "E-Mail bestaetigt.",
            "user": identitaet,
        })),
    )
        .into_response())
}
