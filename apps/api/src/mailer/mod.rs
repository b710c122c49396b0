use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use thiserror::Error;
use tracing::{debug, info};

pub mod templates;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Could not build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("Mail task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// A rendered HTML email ready to send.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to_email: String,
    pub to_name: String,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError>;
}

/// SMTP relay mailer. lettre's transport is blocking, so sends run on the blocking pool.
#[derive(Clone)]
pub struct SmtpMailer {
    host: String,
    credentials: Credentials,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(
        host: String,
        user: String,
        pass: String,
        from_email: &str,
        from_name: &str,
    ) -> Result<Self, MailError> {
        let from = format!("{from_name} <{from_email}>").parse::<Mailbox>()?;
        Ok(Self {
            host,
            credentials: Credentials::new(user, pass),
            from,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        debug!("sending email to {}", &email.to_email);

        let to = format!("{} <{}>", email.to_name, email.to_email).parse::<Mailbox>()?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject)
            .header(ContentType::TEXT_HTML)
            .body(email.html)?;

        let host = self.host.clone();
        let credentials = self.credentials.clone();
        tokio::task::spawn_blocking(move || -> Result<(), MailError> {
            let mailer = SmtpTransport::relay(&host)?.credentials(credentials).build();
            mailer.send(&message)?;
            Ok(())
        })
        .await??;

        info!("Email sent to {}", email.to_email);
        Ok(())
    }
}
