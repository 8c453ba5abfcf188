//! Signed, time-limited login tokens for the emailed sign-in link.
//!
//! Tokens are stateless: there is no revocation list and no single-use
//! enforcement, so replay within the validity window is possible. That is
//! an accepted weakness of the scheme, not something this module hides.

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Fixed context string mixed into key derivation so a leaked signature
/// cannot be repurposed against another HMAC use of the same secret.
const SIGNING_CONTEXT: &[u8] = b"gfax-login-v1";

/// Default validity window for a login link: 15 minutes.
pub const DEFAULT_TOKEN_MAX_AGE: Duration = Duration::from_secs(900);

/// Tolerated clock skew when a token claims to come from the future.
const MAX_CLOCK_SKEW_SECS: i64 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("login token is malformed or has a bad signature")]
    Invalid,
    #[error("login token has expired")]
    Expired,
}

/// Issues and verifies login tokens of the form
/// `base64url(email|issued_at) . base64url(hmac_sha256(payload))`.
pub struct LoginTokenSigner {
    key: Vec<u8>,
}

impl LoginTokenSigner {
    pub fn new(secret: &str) -> Self {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(SIGNING_CONTEXT);
        Self {
            key: mac.finalize().into_bytes().to_vec(),
        }
    }

    pub fn issue(&self, email: &str) -> String {
        self.issue_at(email, Utc::now().timestamp())
    }

    /// Verifies the signature, then the age. Returns the embedded email.
    pub fn verify(&self, token: &str, max_age: Duration) -> Result<String, TokenError> {
        self.verify_at(token, max_age, Utc::now().timestamp())
    }

    fn issue_at(&self, email: &str, issued_at: i64) -> String {
        let payload = format!("{email}|{issued_at}");
        let sig = self.sign(payload.as_bytes());
        format!("{}.{}", B64.encode(payload.as_bytes()), B64.encode(sig))
    }

    fn verify_at(&self, token: &str, max_age: Duration, now: i64) -> Result<String, TokenError> {
        let (payload_b64, sig_b64) = token.split_once('.').ok_or(TokenError::Invalid)?;
        let payload = B64.decode(payload_b64).map_err(|_| TokenError::Invalid)?;
        let sig = B64.decode(sig_b64).map_err(|_| TokenError::Invalid)?;

        // Constant-time comparison via Mac::verify_slice.
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .expect("HMAC accepts keys of any length");
        mac.update(&payload);
        mac.verify_slice(&sig).map_err(|_| TokenError::Invalid)?;

        let payload = String::from_utf8(payload).map_err(|_| TokenError::Invalid)?;
        let (email, issued_at) = payload.rsplit_once('|').ok_or(TokenError::Invalid)?;
        let issued_at: i64 = issued_at.parse().map_err(|_| TokenError::Invalid)?;

        if issued_at > now + MAX_CLOCK_SKEW_SECS {
            return Err(TokenError::Invalid);
        }
        if now - issued_at > max_age.as_secs() as i64 {
            return Err(TokenError::Expired);
        }

        Ok(email.to_string())
    }

    fn sign(&self, payload: &[u8]) -> Vec<u8> {
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .expect("HMAC accepts keys of any length");
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }
}
