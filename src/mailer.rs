// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Email transports for submission dispatch.
//!
//! Two interchangeable backends behind the [`Mailer`] capability:
//!
//! - [`ResendMailer`]: the Resend HTTP API, used whenever its key is
//!   configured
//! - [`SmtpMailer`]: direct SMTP via lettre, used when host and
//!   credentials are configured and no API key is
//!
//! Selection is by configuration presence only. A send failure on the
//! selected transport is surfaced as-is; there is no failover to the
//! other transport.

use crate::config::MailConfig;
use async_trait::async_trait;
use lettre::message::{Mailbox, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const RESEND_API_URL: &str = "https://api.resend.com/emails";
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// One outbound message.
#[derive(Debug, Clone)]
pub struct Email {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub html: String,
}

/// Mail transport error types.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("no email transport configured")]
    NotConfigured,

    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("SMTP error: {0}")]
    Smtp(String),

    #[error("email API error: {0}")]
    Api(String),
}

/// Async email sending capability.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Transport discriminator for logs.
    fn name(&self) -> &'static str;

    /// Send an email. One attempt, no retries.
    async fn send(&self, email: &Email) -> Result<(), MailError>;
}

/// Resend HTTP API transport.
pub struct ResendMailer {
    client: reqwest::Client,
    api_key: String,
}

#[derive(Serialize)]
struct ResendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

impl ResendMailer {
    pub fn new(api_key: String) -> Result<Self, MailError> {
        let client = reqwest::Client::builder()
            .timeout(SEND_TIMEOUT)
            .connect_timeout(SEND_TIMEOUT)
            .build()
            .map_err(|e| MailError::Build(e.to_string()))?;

        Ok(Self { client, api_key })
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    fn name(&self) -> &'static str {
        "resend"
    }

    async fn send(&self, email: &Email) -> Result<(), MailError> {
        let payload = ResendRequest {
            from: email.from.as_str(),
            to: [email.to.as_str()],
            subject: email.subject.as_str(),
            html: email.html.as_str(),
        };

        let response = self
            .client
            .post(RESEND_API_URL)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| MailError::Api(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Api(format!("{}: {}", status, body)));
        }

        debug!(to = %email.to, "delivered via Resend API");
        Ok(())
    }
}

/// Direct SMTP transport via lettre.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Port 465 selects implicit TLS; anything else negotiates STARTTLS.
    pub fn new(host: &str, port: u16, user: String, password: String) -> Result<Self, MailError> {
        let builder = if port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
        }
        .map_err(|e| MailError::Smtp(e.to_string()))?;

        let transport = builder
            .port(port)
            .timeout(Some(SEND_TIMEOUT))
            .credentials(Credentials::new(user, password))
            .build();

        Ok(Self { transport })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    fn name(&self) -> &'static str {
        "smtp"
    }

    async fn send(&self, email: &Email) -> Result<(), MailError> {
        let from: Mailbox = email
            .from
            .parse()
            .map_err(|_| MailError::InvalidAddress(email.from.clone()))?;
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|_| MailError::InvalidAddress(email.to.clone()))?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(&email.subject)
            .singlepart(SinglePart::html(email.html.clone()))
            .map_err(|e| MailError::Build(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::Smtp(e.to_string()))?;

        debug!(to = %email.to, "delivered via SMTP");
        Ok(())
    }
}

/// Select the transport for this process: the first provider in
/// priority order whose required configuration is fully present.
///
/// Resend outranks SMTP. A runtime send failure never escalates to the
/// next provider.
pub fn select_mailer(config: &MailConfig) -> Result<Arc<dyn Mailer>, MailError> {
    if let Some(key) = configured(&config.resend_api_key) {
        return Ok(Arc::new(ResendMailer::new(key.to_string())?));
    }

    if let (Some(host), Some(user), Some(password)) = (
        configured(&config.smtp_host),
        configured(&config.smtp_user),
        configured(&config.smtp_password),
    ) {
        return Ok(Arc::new(SmtpMailer::new(
            host,
            config.smtp_port,
            user.to_string(),
            password.to_string(),
        )?));
    }

    Err(MailError::NotConfigured)
}

fn configured(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
