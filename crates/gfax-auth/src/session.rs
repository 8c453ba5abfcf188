//! Session credential handling: a JWT carried in an HttpOnly cookie,
//! issued once the emailed login token checks out.

use chrono::Utc;
use gfax_types::api::Session;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

pub const SESSION_COOKIE: &str = "gfax_session";

const SESSION_TTL_DAYS: i64 = 7;

pub fn issue_session(
    secret: &str,
    user_id: i64,
    email: &str,
    fax_number: &str,
) -> anyhow::Result<String> {
    let claims = Session {
        sub: user_id,
        email: email.to_string(),
        fax: fax_number.to_string(),
        exp: (Utc::now() + chrono::Duration::days(SESSION_TTL_DAYS)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Returns None on any decode failure: a bad session is simply not a session.
pub fn decode_session(secret: &str, token: &str) -> Option<Session> {
    decode::<Session>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .ok()
}
