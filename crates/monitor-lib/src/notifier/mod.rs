//! Outbound notifications
//!
//! The core only sees the [`Notifier`] trait. Email over SMTP is the one
//! production channel; [`dispatch`] turns an alert decision into sends.

mod dispatch;
mod email;

pub use dispatch::{dispatch, DispatchSummary, NotificationKind};
pub use email::{html_escape, render_html_body, EmailNotifier};

use crate::error::DeliveryError;
use crate::models::Severity;
use async_trait::async_trait;

/// Trait for notification channels
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one notification. Implementations do not retry.
    async fn send(&self, subject: &str, body: &str, severity: Severity) -> Result<(), DeliveryError>;
}
