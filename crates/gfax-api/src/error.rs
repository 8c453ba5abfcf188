use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use thiserror::Error;
use tracing::error;

use gfax_auth::TokenError;
use gfax_db::StoreError;

use crate::pages;

/// The application's failure taxonomy. Note what is NOT here: email
/// delivery failure. Mail is fire-and-forget and never fails the state
/// change that triggered it.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("that email is already registered")]
    DuplicateEmail,

    #[error("no account holds that fax number")]
    RecipientNotFound,

    #[error("this sign-in link has expired")]
    TokenExpired,

    #[error("this sign-in link is not valid")]
    TokenInvalid,

    #[error("{0}")]
    BadRequest(&'static str),

    #[error("that fax is addressed to someone else")]
    Forbidden,

    #[error("not found")]
    NotFound,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::DuplicateEmail => StatusCode::CONFLICT,
            ApiError::RecipientNotFound => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::TokenExpired | ApiError::TokenInvalid => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(e) = &self {
            error!("internal error: {e:#}");
            // Generic page, no internals leaked.
            return (
                self.status(),
                Html(pages::error_page("Something went wrong", "Please try again later.")),
            )
                .into_response();
        }

        let title = match &self {
            ApiError::Forbidden => "Access denied",
            ApiError::NotFound => "Not found",
            ApiError::TokenExpired | ApiError::TokenInvalid => "Sign-in failed",
            _ => "Request failed",
        };
        (self.status(), Html(pages::error_page(title, &self.to_string()))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail => ApiError::DuplicateEmail,
            other => ApiError::Internal(other.into()),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Expired => ApiError::TokenExpired,
            TokenError::Invalid => ApiError::TokenInvalid,
        }
    }
}

/// Redirect used by the session gate; kept separate from ApiError because
/// an unauthenticated browser goes back to the login form, it does not get
/// an error page.
pub fn redirect_to_login() -> Response {
    Redirect::to("/").into_response()
}
