//! Outbound e-mail.

use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use survey_common::config::SmtpConfig;
use survey_common::{AppError, AppResult};
use tracing::{debug, info};

/// Sends plain-text e-mail.
#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    /// Send a message to a single recipient.
    async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()>;
}

/// SMTP mailer built on lettre.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build a mailer from SMTP settings.
    pub fn from_config(config: &SmtpConfig) -> AppResult<Self> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| AppError::Config(format!("Invalid SMTP host: {e}")))?
            .port(config.port);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        let from = format!("{} <{}>", config.from_name, config.from_address)
            .parse::<Mailbox>()
            .map_err(|e| AppError::Config(format!("Invalid sender address: {e}")))?;

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait::async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        let to = to
            .parse::<Mailbox>()
            .map_err(|e| AppError::Validation(format!("Invalid recipient address: {e}")))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to build e-mail: {e}")))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::ExternalService(format!("SMTP send failed: {e}")))?;

        info!(subject = subject, "Sent e-mail");
        Ok(())
    }
}

/// Mailer that only logs. Used when SMTP is not configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpMailer;

#[async_trait::async_trait]
impl Mailer for NoOpMailer {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> AppResult<()> {
        debug!(to = to, subject = subject, "SMTP not configured, dropping e-mail");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn smtp_config() -> SmtpConfig {
        SmtpConfig {
            host: "smtp.example.com".to_string(),
            port: 587,
            username: Some("mailer".to_string()),
            password: Some("secret".to_string()),
            from_address: "noreply@example.com".to_string(),
            from_name: "Team".to_string(),
        }
    }

    #[tokio::test]
    async fn test_smtp_mailer_from_config() {
        let mailer = SmtpMailer::from_config(&smtp_config()).unwrap();
        assert_eq!(mailer.from.email.to_string(), "noreply@example.com");
    }

    #[tokio::test]
    async fn test_smtp_mailer_rejects_bad_sender() {
        let mut config = smtp_config();
        config.from_address = "not an address".to_string();

        assert!(matches!(
            SmtpMailer::from_config(&config),
            Err(AppError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_noop_mailer_accepts_everything() {
        assert!(NoOpMailer.send("a@example.com", "Hi", "Body").await.is_ok());
    }
}
