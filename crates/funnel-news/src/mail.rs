//! SMTP delivery for the assembled digest.
//!
//! STARTTLS with username/password credentials. Delivery is attempted once;
//! a failure is reported to the caller rather than retried, since the next
//! scheduled run will produce a fresh digest anyway.

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

/// SMTP settings for digest delivery.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp_server: String,
    pub smtp_port: u16,
    pub sender: String,
    pub password: String,
    pub recipient: String,
}

/// Send the digest as a plain-text email.
pub async fn send_digest(config: &MailConfig, subject: &str, body: &str) -> Result<(), String> {
    let email = Message::builder()
        .from(
            config
                .sender
                .parse()
                .map_err(|e| format!("invalid sender address '{}': {e}", config.sender))?,
        )
        .to(config
            .recipient
            .parse()
            .map_err(|e| format!("invalid recipient address '{}': {e}", config.recipient))?)
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(body.to_string())
        .map_err(|e| format!("failed to build email: {e}"))?;

    let creds = Credentials::new(config.sender.clone(), config.password.clone());
    let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_server)
        .map_err(|e| format!("failed to connect to {}: {e}", config.smtp_server))?
        .port(config.smtp_port)
        .credentials(creds)
        .build();

    mailer
        .send(email)
        .await
        .map_err(|e| format!("failed to send email: {e}"))?;

    info!("Email sent to {}", config.recipient);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> MailConfig {
        MailConfig {
            smtp_server: "smtp.example.com".into(),
            smtp_port: 587,
            sender: "not an address".into(),
            password: "secret".into(),
            recipient: "reader@example.com".into(),
        }
    }

    #[tokio::test]
    async fn invalid_sender_is_reported_before_any_network_io() {
        let err = send_digest(&config(), "subject", "body").await.unwrap_err();
        assert!(err.contains("invalid sender address"));
    }
}
