//! Outbound notifications
//!
//! Delivery sits behind the [`Notifier`] trait so the rest of the code never
//! touches SMTP directly. The `email.driver` setting picks the backend:
//! `smtp` sends real mail through lettre, anything else logs the message.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, Message, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    SmtpTransport, Transport,
};

use crate::config::EmailConfig;
use crate::error::{AppError, AppResult};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()>;
}

/// Pick the notifier backend from configuration.
pub fn notifier_from_config(config: &EmailConfig) -> Arc<dyn Notifier> {
    match config.driver.as_str() {
        "smtp" => Arc::new(SmtpNotifier::new(config.clone())),
        "log" => Arc::new(LogNotifier),
        other => {
            tracing::warn!("Unknown email driver '{}', falling back to log", other);
            Arc::new(LogNotifier)
        }
    }
}

/// Fire-and-forget delivery. A failure is logged together with `fallback`
/// (the payload an operator needs to pass along manually) and never
/// propagated to the caller.
pub async fn send_or_log(
    notifier: &dyn Notifier,
    to: &str,
    subject: &str,
    body: &str,
    fallback: &str,
) {
    if let Err(e) = notifier.send(to, subject, body).await {
        tracing::warn!(to, fallback, "Notification delivery failed: {e}");
    }
}

/// Subject and body for a password reset code email.
pub fn reset_code_message(code: &str) -> (String, String) {
    let subject = "Your Toolshed password reset code".to_string();
    let body = format!(
        "Your password reset code is: {code}\n\n\
         This code expires in 15 minutes.\n\n\
         If you didn't request a reset, you can ignore this email.\n"
    );
    (subject, body)
}

/// SMTP delivery via lettre
pub struct SmtpNotifier {
    config: EmailConfig,
}

impl SmtpNotifier {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        let from_name = self.config.smtp_from_name.as_deref().unwrap_or("Toolshed");
        let from_mailbox =
            Mailbox::from_str(&format!("{} <{}>", from_name, self.config.smtp_from))
                .map_err(|e| AppError::Internal(format!("Invalid from address: {}", e)))?;
        let to_mailbox = Mailbox::from_str(to)
            .map_err(|e| AppError::Internal(format!("Invalid to address: {}", e)))?;

        let email = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(format!(
                                r#"<html><body><pre>{}</pre></body></html>"#,
                                body.replace('\n', "<br>")
                            )),
                    ),
            )
            .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))?;

        let mailer_builder = if self.config.smtp_use_tls {
            SmtpTransport::starttls_relay(&self.config.smtp_host).map_err(|e| {
                AppError::Internal(format!("Failed to create SMTP transport: {}", e))
            })?
        } else {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
        }
        .port(self.config.smtp_port);

        let mailer_builder = if let (Some(username), Some(password)) =
            (&self.config.smtp_username, &self.config.smtp_password)
        {
            mailer_builder.credentials(Credentials::new(username.clone(), password.clone()))
        } else {
            mailer_builder
        };

        mailer_builder
            .build()
            .send(&email)
            .map_err(|e| AppError::Internal(format!("Failed to send email: {}", e)))?;

        Ok(())
    }
}

/// Log-only delivery for development and tests
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        tracing::info!(to, subject, "Email (log driver):\n{}", body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_message_contains_code() {
        let (subject, body) = reset_code_message("482913");
        assert!(subject.contains("reset"));
        assert!(body.contains("482913"));
        assert!(body.contains("15 minutes"));
    }

    #[test]
    fn unknown_driver_falls_back_to_log() {
        let config = EmailConfig {
            driver: "carrier-pigeon".into(),
            ..EmailConfig::default()
        };
        // Must not panic; the concrete type is opaque behind the trait.
        let _ = notifier_from_config(&config);
    }

    #[tokio::test]
    async fn log_notifier_always_succeeds() {
        let result = LogNotifier
            .send("user@example.com", "subject", "body")
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn delivery_failure_is_swallowed() {
        let mut mock = MockNotifier::new();
        mock.expect_send()
            .times(1)
            .returning(|_, _, _| Err(AppError::Internal("smtp down".into())));
        send_or_log(&mock, "user@example.com", "subject", "body", "482913").await;
    }

    #[tokio::test]
    async fn delivery_success_sends_exactly_once() {
        let mut mock = MockNotifier::new();
        mock.expect_send().times(1).returning(|_, _, _| Ok(()));
        send_or_log(&mock, "user@example.com", "subject", "body", "482913").await;
    }
}
