use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use gfax_mail::MailConfig;

/// Environment-driven configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub secret: String,
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    /// Base URL used in emailed login links.
    pub public_url: String,
    pub token_max_age: Duration,
    pub mail: MailConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let secret =
            std::env::var("GFAX_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
        let db_path = std::env::var("GFAX_DB_PATH").unwrap_or_else(|_| "gfax.db".into());
        let host = std::env::var("GFAX_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = std::env::var("GFAX_PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .context("GFAX_PORT must be a port number")?;
        let public_url = std::env::var("GFAX_PUBLIC_URL")
            .unwrap_or_else(|_| format!("http://localhost:{port}"));
        let token_max_age = match std::env::var("GFAX_TOKEN_MAX_AGE_SECS") {
            Ok(raw) => Duration::from_secs(
                raw.parse()
                    .context("GFAX_TOKEN_MAX_AGE_SECS must be a number of seconds")?,
            ),
            Err(_) => gfax_auth::DEFAULT_TOKEN_MAX_AGE,
        };

        let mail = MailConfig {
            smtp_host: std::env::var("GFAX_SMTP_HOST").ok(),
            smtp_port: match std::env::var("GFAX_SMTP_PORT") {
                Ok(raw) => Some(raw.parse().context("GFAX_SMTP_PORT must be a port number")?),
                Err(_) => None,
            },
            smtp_user: std::env::var("GFAX_SMTP_USER").ok(),
            smtp_pass: std::env::var("GFAX_SMTP_PASS").ok(),
            from: std::env::var("GFAX_MAIL_FROM")
                .unwrap_or_else(|_| "GFAX <noreply@gfax.example>".into()),
        };

        Ok(Self {
            secret,
            db_path: PathBuf::from(db_path),
            host,
            port,
            public_url,
            token_max_age,
            mail,
        })
    }
}
