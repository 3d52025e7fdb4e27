//! wcp-mail: emails the finished report.
//!
//! [`Mailer::compose`] builds a `multipart/mixed` message with a plain-text
//! body and one base64 attachment per file; [`Mailer::send`] reads the files
//! with `tokio::fs` and delivers the message over STARTTLS SMTP (rustls) using
//! the configured sender's credentials.

use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::path::{Path, PathBuf};
use wcp_core::config::SmtpConfig;
use wcp_core::export::ExportFormat;
use wcp_core::window::DATE_FORMAT;
use wcp_core::ReportWindow;

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("invalid address {address:?}: {source}")]
    Address {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    #[error("no receivers configured")]
    NoReceivers,

    #[error("failed to read attachment {path}: {source}")]
    Attachment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("smtp: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// A report file read into memory, ready to attach.
#[derive(Debug, Clone)]
pub struct ReportAttachment {
    filename: String,
    content_type: ContentType,
    bytes: Vec<u8>,
}

impl ReportAttachment {
    pub async fn read(path: &Path) -> Result<Self, MailError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| MailError::Attachment {
            path: path.to_path_buf(),
            source,
        })?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "report".to_string());
        let content_type = ExportFormat::from_path(path)
            .and_then(|format| ContentType::parse(format.mime_type()).ok())
            .unwrap_or(ContentType::TEXT_PLAIN);

        Ok(Self {
            filename,
            content_type,
            bytes,
        })
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    fn into_part(self) -> SinglePart {
        Attachment::new(self.filename).body(self.bytes, self.content_type)
    }
}

/// Subject and body for the report email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub body: String,
}

/// The fixed report email for `window`.
pub fn notification(window: &ReportWindow) -> Notification {
    let subject = match window.cadence() {
        wcp_core::Cadence::Custom => "WCP Detrack Report Notification".to_string(),
        cadence => format!("WCP Detrack {cadence} Report Notification"),
    };
    let body = format!(
        "Hi,\n\nAttached is the report for Detrack from {} to {}.\n\nThanks",
        window.from().format(DATE_FORMAT),
        window.to().format(DATE_FORMAT),
    );
    Notification { subject, body }
}

pub struct Mailer {
    host: String,
    port: u16,
    sender: String,
    password: String,
    receivers: Vec<String>,
}

impl Mailer {
    pub fn new(config: &SmtpConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            sender: config.sender.clone(),
            password: config.password.clone(),
            receivers: split_receivers(&config.receivers),
        }
    }

    pub fn receivers(&self) -> &[String] {
        &self.receivers
    }

    /// Build the message without sending it.
    pub fn compose(
        &self,
        notification: &Notification,
        attachments: Vec<ReportAttachment>,
    ) -> Result<Message, MailError> {
        if self.receivers.is_empty() {
            return Err(MailError::NoReceivers);
        }

        let mut builder = Message::builder()
            .from(mailbox(&self.sender)?)
            .subject(notification.subject.as_str());
        for receiver in &self.receivers {
            builder = builder.to(mailbox(receiver)?);
        }

        let mut parts = MultiPart::mixed().singlepart(SinglePart::plain(notification.body.clone()));
        for attachment in attachments {
            parts = parts.singlepart(attachment.into_part());
        }

        Ok(builder.multipart(parts)?)
    }

    /// Read every file in `attachments`, then compose and send.
    pub async fn send(&self, notification: &Notification, attachments: &[PathBuf]) -> Result<(), MailError> {
        let mut loaded = Vec::with_capacity(attachments.len());
        for path in attachments {
            loaded.push(ReportAttachment::read(path).await?);
        }
        let message = self.compose(notification, loaded)?;
        let transport = self.transport()?;

        if let Err(err) = transport.send(message).await {
            tracing::error!(host = %self.host, error = %err, "failed to send email");
            return Err(err.into());
        }

        tracing::info!(receivers = self.receivers.len(), "email sent successfully");
        Ok(())
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, MailError> {
        Ok(AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)?
            .port(self.port)
            .credentials(Credentials::new(self.sender.clone(), self.password.clone()))
            .build())
    }
}

fn split_receivers(receivers: &str) -> Vec<String> {
    receivers
        .split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect()
}

fn mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.parse().map_err(|source| MailError::Address {
        address: address.to_string(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
