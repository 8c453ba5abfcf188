use serde::{Deserialize, Serialize};

// -- Session claims --

/// Session claims shared between gfax-auth (issuing the cookie after a
/// verified login link) and gfax-api (session middleware). Canonical
/// definition lives here in gfax-types to eliminate duplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// User id (users.id).
    pub sub: i64,
    pub email: String,
    /// The user's own fax number, e.g. "GFAX-1001".
    pub fax: String,
    pub exp: usize,
}

// -- Forms --

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequestForm {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ComposeForm {
    pub recipient: String,
    pub content: String,
}
