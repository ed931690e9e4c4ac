//! Email channel — SMTP delivery via async lettre.

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart, SinglePart, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use vigil_core::config::EmailConfig;
use vigil_core::error::{Result, VigilError};
use vigil_core::notification::Notification;
use vigil_core::traits::Notifier;

/// Sends each notification as one email: subject = summary, body built from
/// the text/plain and text/html renditions (multipart/alternative when both
/// exist). Credentials are optional; without them the relay is used
/// unauthenticated.
pub struct EmailNotifier {
    config: EmailConfig,
    from: Mailbox,
    to: Mailbox,
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl EmailNotifier {
    pub fn new(config: EmailConfig) -> Result<Self> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| VigilError::notify(format!("Invalid from address: {e}")))?;
        let to: Mailbox = config
            .to
            .parse()
            .map_err(|e| VigilError::notify(format!("Invalid to address: {e}")))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| VigilError::notify(format!("SMTP relay: {e}")))?
            .port(config.smtp_port);
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }
        let mailer = builder.build();

        Ok(Self {
            config,
            from,
            to,
            mailer,
        })
    }

    fn build_message(&self, notification: &Notification) -> Result<Message> {
        let builder = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(&notification.summary);

        let plain = notification.plain_text().to_string();
        let message = match notification.html() {
            Some(html) => builder.multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(plain),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html.to_string()),
                    ),
            ),
            None => builder.header(ContentType::TEXT_PLAIN).body(plain),
        };
        message.map_err(|e| VigilError::notify(format!("Build email: {e}")))
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn notify(&self, job_name: &str, notification: &Notification) -> Result<()> {
        let message = self.build_message(notification)?;
        self.mailer
            .send(message)
            .await
            .map_err(|e| VigilError::notify(format!("SMTP send: {e}")))?;
        tracing::info!(
            "📤 Emailed '{}' notification to {}",
            job_name,
            self.config.to
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> EmailConfig {
        EmailConfig {
            smtp_host: "smtp.example.com".into(),
            smtp_port: 587,
            from: "Vigil <vigil@example.com>".into(),
            to: "admin@example.com".into(),
            username: None,
            password: None,
        }
    }

    #[tokio::test]
    async fn builds_multipart_when_html_is_present() {
        let notifier = EmailNotifier::new(test_config()).unwrap();
        let notification = Notification::new("2 new items for “feed”")
            .with_body("text/plain", "New: Alpha\nNew: Beta")
            .with_body("text/html", "<ul><li>Alpha</li><li>Beta</li></ul>");

        let message = notifier.build_message(&notification).unwrap();
        let rendered = String::from_utf8(message.formatted()).unwrap();
        assert!(rendered.contains("multipart/alternative"));
        assert!(rendered.contains("New: Alpha"));
        assert!(rendered.contains("<li>Alpha</li>"));
    }

    #[tokio::test]
    async fn plain_only_notifications_stay_single_part() {
        let notifier = EmailNotifier::new(test_config()).unwrap();
        let message = notifier
            .build_message(&Notification::new("file changed"))
            .unwrap();
        let rendered = String::from_utf8(message.formatted()).unwrap();
        assert!(!rendered.contains("multipart/alternative"));
        assert!(rendered.contains("Subject: file changed"));
    }

    #[test]
    fn invalid_addresses_are_rejected_up_front() {
        let mut config = test_config();
        config.to = "not an address".into();
        assert!(matches!(
            EmailNotifier::new(config),
            Err(VigilError::Notify(_))
        ));
    }
}
