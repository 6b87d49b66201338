//! Route-Definitionen fuer die REST-API

use axum::{
    routing::{get, post},
    Router,
};

use crate::rest::{handlers, AppState};

/// Erstellt den Router fuer `/auth/...` und `/users/...`
pub fn api_router() -> Router<AppState> {
    Router::new()
        // Auth
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/forgot-password", post(handlers::auth::forgot_password))
        .route("/auth/reset-password", post(handlers::auth::reset_password))
        .route("/auth/verify-email/:token", get(handlers::auth::verify_email))
        // Eigenes Konto
        .route(
            "/users/me",
            get(handlers::users::get_me).put(handlers::users::put_me),
        )
}
