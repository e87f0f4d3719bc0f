//! Outgoing mail delivery over SMTP

use crate::contact::ContactEmailJob;
use crate::error::MailResult;
use crate::template::render_contact_response;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use scholarly_core::EmailSettings;
use std::time::Duration;
use tracing::{debug, info};

/// A rendered email ready to be delivered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

impl OutgoingEmail {
    /// Render the acknowledgement for a contact job
    pub fn for_contact(job: &ContactEmailJob) -> MailResult<Self> {
        Ok(Self {
            to: job.to_email.clone(),
            subject: job.subject.clone(),
            html_body: render_contact_response(&job.context)?,
        })
    }
}

/// Delivers rendered emails
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> MailResult<()>;
}

/// SMTP relay mailer
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

fn is_local(host: &str) -> bool {
    matches!(host, "localhost" | "127.0.0.1" | "::1")
}

impl SmtpMailer {
    /// Build a mailer for the configured relay.
    ///
    /// Port 465 uses implicit TLS, local hosts use plain SMTP for development
    /// relays, everything else uses STARTTLS.
    pub fn from_settings(settings: &EmailSettings) -> MailResult<Self> {
        let from: Mailbox = settings.default_from_email.parse()?;

        let mut builder = if is_local(&settings.host) {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
        } else if settings.port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)?
        };

        builder = builder
            .port(settings.port)
            .timeout(Some(Duration::from_secs(30)));

        if let (Some(user), Some(password)) = (&settings.username, &settings.password) {
            builder = builder.credentials(Credentials::new(
                user.clone(),
                password.expose().to_string(),
            ));
        }

        info!(
            host = %settings.host,
            port = settings.port,
            authenticated = settings.username.is_some(),
            "Configured SMTP mailer"
        );

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> MailResult<()> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(email.to.parse()?)
            .subject(email.subject.clone())
            .header(ContentType::TEXT_HTML)
            .body(email.html_body.clone())?;

        let response = self.transport.send(message).await?;
        debug!(to = %email.to, code = %response.code(), "SMTP relay accepted message");

        Ok(())
    }
}
