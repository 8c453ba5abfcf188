//! Outbound mail: login links and fax-received notices.
//!
//! Delivery is strictly best-effort. Nothing here may fail or roll back
//! the state change that triggered the mail; callers fire these futures
//! from a spawned task and log the outcome.

use std::time::Duration;

use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::info;

/// Keeps a slow SMTP server from hanging the request handler.
const SMTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mailer is disabled (no SMTP host configured)")]
    Disabled,
    #[error("bad mail address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("could not build message: {0}")]
    Build(#[from] lettre::error::Error),
    #[error("smtp failure: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

#[derive(Debug, Clone, Default)]
pub struct MailConfig {
    /// None disables the mailer entirely (degraded-fallback mode).
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    pub smtp_user: Option<String>,
    pub smtp_pass: Option<String>,
    pub from: String,
}

pub struct Mailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: Mailbox,
}

impl Mailer {
    pub fn new(config: &MailConfig) -> anyhow::Result<Self> {
        let from: Mailbox = config.from.parse()?;

        let transport = match &config.smtp_host {
            Some(host) => {
                let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(host)?
                    .timeout(Some(SMTP_TIMEOUT));
                if let Some(port) = config.smtp_port {
                    builder = builder.port(port);
                }
                if let (Some(user), Some(pass)) = (&config.smtp_user, &config.smtp_pass) {
                    builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
                }
                info!("Mailer configured for SMTP relay {}", host);
                Some(builder.build())
            }
            None => {
                info!("No SMTP host configured, mailer disabled");
                None
            }
        };

        Ok(Self { transport, from })
    }

    /// A mailer that never sends, for tests and degraded deployments.
    pub fn disabled() -> Self {
        Self {
            transport: None,
            from: Mailbox::new(None, lettre::Address::new("noreply", "gfax.invalid")
                .expect("static address is valid")),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    pub async fn send_login_link(&self, to: &str, url: &str) -> Result<(), MailError> {
        let body = format!(
            "Click the link below to sign in to GFAX.\n\n{url}\n\n\
             The link expires shortly. If you did not request it, ignore this mail.\n"
        );
        self.send(to, "Your GFAX sign-in link", body).await
    }

    pub async fn send_fax_notice(&self, to: &str, sender_fax: &str) -> Result<(), MailError> {
        let body = format!(
            "A new fax from {sender_fax} is waiting in your GFAX inbox.\n\n\
             Sign in to read it.\n"
        );
        self.send(to, &format!("New fax from {sender_fax}"), body)
            .await
    }

    async fn send(&self, to: &str, subject: &str, body: String) -> Result<(), MailError> {
        let transport = self.transport.as_ref().ok_or(MailError::Disabled)?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse()?)
            .subject(subject)
            .body(body)?;

        transport.send(message).await?;
        Ok(())
    }
}
