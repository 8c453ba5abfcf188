pub mod session;
pub mod token;

pub use session::{SESSION_COOKIE, decode_session, issue_session};
pub use token::{DEFAULT_TOKEN_MAX_AGE, LoginTokenSigner, TokenError};
