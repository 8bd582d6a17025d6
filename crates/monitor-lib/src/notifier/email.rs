//! Email notification delivery via SMTP.
//!
//! [`EmailNotifier`] wraps the `lettre` async SMTP transport. Connections use
//! STARTTLS and authenticate with the sender credentials; every message is
//! addressed to all configured administrators in one `To` header.

use async_trait::async_trait;
use chrono::{DateTime, Local};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use super::Notifier;
use crate::config::SmtpSettings;
use crate::error::DeliveryError;
use crate::models::Severity;

/// Sends notifications to the administrators over SMTP
pub struct EmailNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    recipients: Vec<Mailbox>,
}

impl EmailNotifier {
    /// Build the transport and parse addresses. No connection is opened
    /// until the first send.
    pub fn new(settings: &SmtpSettings) -> Result<Self, DeliveryError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.server)?
            .port(settings.port)
            .credentials(Credentials::new(
                settings.sender.clone(),
                settings.password.clone(),
            ))
            .build();

        let from: Mailbox = settings.sender.parse()?;
        let recipients = settings
            .recipients
            .iter()
            .map(|r| r.parse::<Mailbox>())
            .collect::<Result<Vec<_>, _>>()?;

        if recipients.is_empty() {
            return Err(DeliveryError::NoRecipients);
        }

        Ok(Self {
            transport,
            from,
            recipients,
        })
    }

    fn build_message(
        &self,
        subject: &str,
        content_type: ContentType,
        body: String,
    ) -> Result<Message, DeliveryError> {
        let mut builder = Message::builder().from(self.from.clone()).subject(subject);
        for recipient in &self.recipients {
            builder = builder.to(recipient.clone());
        }
        Ok(builder.header(content_type).body(body)?)
    }

    /// Build the HTML alert message for `subject`/`report`
    pub fn alert_message(
        &self,
        subject: &str,
        report: &str,
        severity: Severity,
        timestamp: DateTime<Local>,
    ) -> Result<Message, DeliveryError> {
        self.build_message(
            &tagged_subject(subject, severity),
            ContentType::TEXT_HTML,
            render_html_body(severity, timestamp, report),
        )
    }

    /// Send a plain-text message, used by the configuration test
    pub async fn send_plain(&self, subject: &str, body: &str) -> Result<(), DeliveryError> {
        let message = self.build_message(subject, ContentType::TEXT_PLAIN, body.to_string())?;
        self.transport.send(message).await?;
        info!(subject = %subject, recipients = self.recipients.len(), "Email sent");
        Ok(())
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn send(&self, subject: &str, body: &str, severity: Severity) -> Result<(), DeliveryError> {
        let message = self.alert_message(subject, body, severity, Local::now())?;
        self.transport.send(message).await?;
        info!(
            subject = %subject,
            severity = %severity,
            recipients = self.recipients.len(),
            "Email sent"
        );
        Ok(())
    }
}

fn tagged_subject(subject: &str, severity: Severity) -> String {
    let tag = match severity {
        Severity::Normal => "INFO",
        other => other.tag(),
    };
    format!("[{}] {}", tag, subject)
}

/// HTML fragment wrapping a preformatted report
pub fn render_html_body(severity: Severity, timestamp: DateTime<Local>, report: &str) -> String {
    format!(
        "<html>\n  <body>\n    <h2>Host Monitoring Alert</h2>\n    \
         <p><strong>Severity:</strong> {}</p>\n    \
         <p><strong>Timestamp:</strong> {}</p>\n    \
         <pre>{}</pre>\n    <hr>\n    \
         <small>Sent by host-monitor</small>\n  </body>\n</html>\n",
        severity.tag(),
        timestamp.format("%Y-%m-%d %H:%M:%S"),
        html_escape(report)
    )
}

pub fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
