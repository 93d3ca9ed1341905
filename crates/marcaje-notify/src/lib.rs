//! # marcaje-notify
//!
//! The production [`Notifier`]: plain-text email over an authenticated
//! STARTTLS relay. A fresh transport per send — sends happen from
//! concurrent workers and the connection is not worth pooling at this
//! volume.

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::Mailbox, message::header::ContentType,
    transport::smtp::authentication::Credentials,
};

use marcaje_core::config::EmailConfig;
use marcaje_core::{MarcajeError, Notifier, Result};

/// SMTP mailer.
pub struct Mailer {
    config: EmailConfig,
}

impl Mailer {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Notifier for Mailer {
    async fn send(&self, subject: &str, body: &str) -> Result<()> {
        let from: Mailbox = self
            .config
            .address
            .parse()
            .map_err(|e| MarcajeError::Notify(format!("invalid sender address: {e}")))?;
        let to: Mailbox = self
            .config
            .recipient()
            .parse()
            .map_err(|e| MarcajeError::Notify(format!("invalid recipient address: {e}")))?;

        let email = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| MarcajeError::Notify(format!("build email: {e}")))?;

        let creds = Credentials::new(self.config.address.clone(), self.config.password.clone());

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)
            .map_err(|e| MarcajeError::Notify(format!("SMTP relay: {e}")))?
            .port(self.config.smtp_port)
            .credentials(creds)
            .build();

        mailer
            .send(email)
            .await
            .map_err(|e| MarcajeError::Notify(format!("SMTP send: {e}")))?;

        tracing::info!("📤 Email sent: {subject}");
        Ok(())
    }
}
