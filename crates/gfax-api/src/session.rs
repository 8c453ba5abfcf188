use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use gfax_auth::{SESSION_COOKIE, decode_session};

use crate::AppState;
use crate::error::redirect_to_login;

/// Session gate for protected routes. A missing or undecodable session
/// cookie sends the browser back to the login form; a valid one lands the
/// claims in request extensions for the handlers.
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let session = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| decode_session(&state.secret, cookie.value()));

    let Some(session) = session else {
        return redirect_to_login();
    };

    req.extensions_mut().insert(session);
    next.run(req).await
}
