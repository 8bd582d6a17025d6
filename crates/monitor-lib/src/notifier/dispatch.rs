//! Turn an alert decision into notifications
//!
//! Sends are independent: a failed critical alert does not stop the warning
//! alert or the daily report from being attempted. Nothing is retried.

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::Notifier;
use crate::models::{AlertDecision, MetricKind, Severity};

/// The notifications a pass can send, in send order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    CriticalAlert,
    WarningAlert,
    DailyReport,
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationKind::CriticalAlert => write!(f, "critical_alert"),
            NotificationKind::WarningAlert => write!(f, "warning_alert"),
            NotificationKind::DailyReport => write!(f, "daily_report"),
        }
    }
}

/// Outcome of dispatching one decision
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DispatchSummary {
    pub delivered: Vec<NotificationKind>,
    /// Failed sends with the delivery error text
    pub failed: Vec<(NotificationKind, String)>,
}

impl DispatchSummary {
    pub fn attempted(&self) -> usize {
        self.delivered.len() + self.failed.len()
    }

    pub fn all_delivered(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Send every notification the decision calls for
pub async fn dispatch(decision: &AlertDecision, notifier: &dyn Notifier) -> DispatchSummary {
    let mut summary = DispatchSummary::default();

    for (kind, subject, severity) in planned_notifications(decision) {
        match notifier.send(&subject, &decision.payload, severity).await {
            Ok(()) => {
                info!(notification = %kind, subject = %subject, "Notification delivered");
                summary.delivered.push(kind);
            }
            Err(e) => {
                error!(notification = %kind, subject = %subject, error = %e, "Failed to deliver notification");
                summary.failed.push((kind, e.to_string()));
            }
        }
    }

    summary
}

fn planned_notifications(decision: &AlertDecision) -> Vec<(NotificationKind, String, Severity)> {
    let mut planned = Vec::new();

    if decision.should_send_critical {
        planned.push((
            NotificationKind::CriticalAlert,
            format!("Critical system alert: {}", join_labels(&decision.critical_metrics)),
            Severity::Critical,
        ));
    }
    if decision.should_send_warning {
        planned.push((
            NotificationKind::WarningAlert,
            format!("System warning: {}", join_labels(&decision.warning_metrics)),
            Severity::Warning,
        ));
    }
    if decision.should_send_daily_report {
        planned.push((
            NotificationKind::DailyReport,
            "Daily system report".to_string(),
            Severity::Normal,
        ));
    }

    planned
}

fn join_labels(kinds: &[MetricKind]) -> String {
    kinds
        .iter()
        .map(|k| k.label().to_lowercase())
        .collect::<Vec<_>>()
        .join(", ")
}
