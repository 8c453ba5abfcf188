use axum::{
    Form,
    extract::{Path, State},
    response::{Html, Redirect},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::{error, info, warn};

use gfax_auth::{SESSION_COOKIE, issue_session};
use gfax_types::api::{LoginRequestForm, RegisterForm};

use crate::error::ApiError;
use crate::{AppState, pages};

pub async fn login_page() -> Html<String> {
    Html(pages::login_page())
}

pub async fn register_page() -> Html<String> {
    Html(pages::register_page())
}

/// POST / — request a sign-in link for an email address.
///
/// Unknown addresses get the same confirmation page as known ones, so the
/// form cannot be used to probe which emails hold accounts. When no SMTP
/// relay is configured the app runs degraded and shows the link inline
/// instead of mailing it.
pub async fn request_login(
    State(state): State<AppState>,
    Form(form): Form<LoginRequestForm>,
) -> Result<Html<String>, ApiError> {
    let email = form.email.trim().to_ascii_lowercase();
    if email.is_empty() {
        return Err(ApiError::BadRequest("email must not be empty"));
    }

    let db = state.clone();
    let lookup = email.clone();
    let user = tokio::task::spawn_blocking(move || db.db.user_by_email(&lookup))
        .await
        .map_err(join_error)??;

    let Some(user) = user else {
        return Ok(Html(pages::login_link_sent(&email, None)));
    };

    let token = state.tokens.issue(&user.email);
    let link = format!(
        "{}/login/{}",
        state.public_url.trim_end_matches('/'),
        token
    );

    if state.mailer.is_enabled() {
        let mail_state = state.clone();
        let to = user.email.clone();
        let url = link.clone();
        tokio::spawn(async move {
            if let Err(e) = mail_state.mailer.send_login_link(&to, &url).await {
                warn!("login link mail to {} failed: {}", to, e);
            }
        });
        Ok(Html(pages::login_link_sent(&email, None)))
    } else {
        // Degraded fallback: no relay configured, surface the link directly
        // so sign-in still works.
        warn!("mailer disabled, showing login link inline for {}", email);
        Ok(Html(pages::login_link_sent(&email, Some(&link))))
    }
}

/// POST /register — create an account and show the assigned fax number.
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<Html<String>, ApiError> {
    let email = form.email.trim().to_ascii_lowercase();
    if email.len() < 3 || email.len() > 254 || !email.contains('@') {
        return Err(ApiError::BadRequest("that does not look like an email address"));
    }

    let db = state.clone();
    let insert = email.clone();
    let user = tokio::task::spawn_blocking(move || db.db.register_user(&insert))
        .await
        .map_err(join_error)??;

    info!("registered {} as {}", user.email, user.fax_number);
    Ok(Html(pages::registered(&user.email, &user.fax_number)))
}

/// GET /login/{token} — verify the emailed token and establish a session.
pub async fn login_with_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), ApiError> {
    let email = state.tokens.verify(&token, state.token_max_age)?;

    let db = state.clone();
    let lookup = email.clone();
    let user = tokio::task::spawn_blocking(move || db.db.user_by_email(&lookup))
        .await
        .map_err(join_error)??
        // Account gone between issue and click; treat like a bad token.
        .ok_or(ApiError::TokenInvalid)?;

    let session = issue_session(&state.secret, user.id, &user.email, &user.fax_number)?;

    let cookie = Cookie::build((SESSION_COOKIE, session))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    info!("{} signed in", user.fax_number);
    Ok((jar.add(cookie), Redirect::to("/dashboard")))
}

/// GET /logout — clear the session cookie.
pub async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    let mut cookie = Cookie::from(SESSION_COOKIE);
    cookie.set_path("/");
    (jar.remove(cookie), Redirect::to("/"))
}

pub(crate) fn join_error(e: tokio::task::JoinError) -> ApiError {
    error!("spawn_blocking join error: {}", e);
    ApiError::Internal(anyhow::anyhow!("blocking task failed"))
}
