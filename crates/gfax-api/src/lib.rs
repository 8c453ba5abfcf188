pub mod auth;
pub mod error;
pub mod faxes;
pub mod pages;
pub mod session;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router, middleware,
    routing::get,
};

use gfax_auth::LoginTokenSigner;
use gfax_db::Database;
use gfax_mail::Mailer;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub tokens: LoginTokenSigner,
    pub mailer: Mailer,
    /// Signing secret for session cookies. Set once at startup, read-only after.
    pub secret: String,
    /// Base URL used when building emailed login links.
    pub public_url: String,
    pub token_max_age: Duration,
}

pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/", get(auth::login_page).post(auth::request_login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/login/{token}", get(auth::login_with_token))
        .route("/logout", get(auth::logout))
        .route("/healthz", get(healthz));

    let protected = Router::new()
        .route("/dashboard", get(faxes::dashboard))
        .route("/compose", get(faxes::compose_page).post(faxes::compose))
        .route("/view/{message_id}", get(faxes::view_fax))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session::require_session,
        ));

    public.merge(protected).with_state(state)
}

async fn healthz() -> &'static str {
    "OK"
}
