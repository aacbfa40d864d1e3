use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use secrecy::{ExposeSecret, SecretString};
use tracing::info;

/// Mail delivery seam. Implementations either deliver or return an error;
/// callers treat delivery as best-effort and only log failures.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()>;
}

/// Local dev notifier that logs the message instead of sending real email.
/// Used whenever SMTP credentials are not configured.
#[derive(Clone, Debug)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        info!(
            to_email = %to,
            subject = %subject,
            body = %body,
            "mail delivery stub"
        );
        Ok(())
    }
}

pub struct SmtpNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    /// Build a TLS SMTP transport against the given relay.
    ///
    /// # Errors
    /// Returns an error if the relay host or from-address is invalid.
    pub fn new(
        relay: &str,
        username: String,
        password: &SecretString,
        from: &str,
    ) -> Result<Self> {
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(relay)
            .context("Failed to create SMTP transport")?
            .credentials(Credentials::new(
                username,
                password.expose_secret().to_string(),
            ))
            .build();

        let from = from
            .parse()
            .map_err(|e| anyhow!("Invalid from address: {e}"))?;

        Ok(Self { mailer, from })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let email = Message::builder()
            .from(self.from.clone())
            .to(to.parse().map_err(|e| anyhow!("Invalid to address: {e}"))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .context("Failed to build email")?;

        self.mailer
            .send(email)
            .await
            .context("Failed to send email")?;

        Ok(())
    }
}
