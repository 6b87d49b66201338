//! REST-Handler fuer das eigene Konto

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use gatekeep_auth::{AuthError, ProfilUpdate};

use crate::rest::error::RestError;
use crate::rest::AppState;

/// GET /users/me
pub async fn get_me(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, RestError> {
    let principal = state.principal(&headers)?;
    let identitaet = state
        .auth
        .aktuelle_identitaet(&principal)
        .await
        .map_err(konto_weg)?;
    Ok((StatusCode::OK, Json(identitaet)).into_response())
}

/// PUT /users/me
pub async fn put_me(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ProfilUpdate>,
) -> Result<Response, RestError> {
    let principal = state.principal(&headers)?;
    let identitaet = state
        .auth
        .profil_aktualisieren(principal.id, body)
        .await
        .map_err(konto_weg)?;
    Ok((StatusCode::OK, Json(identitaet)).into_response())
}

/// Gueltiges Token, aber das Konto existiert nicht mehr
fn konto_weg(e: AuthError) -> RestError {
    match e {
        AuthError::NichtGefunden(_) => RestError::NichtAngemeldet,
        andere => andere.into(),
    }
}
