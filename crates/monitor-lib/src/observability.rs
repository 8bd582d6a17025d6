//! Observability infrastructure for the host monitor
//!
//! Provides:
//! - Subscriber setup: console output plus an append-only log file
//! - Structured event logging for passes, metrics and deliveries

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::models::{AlertDecision, MetricStatus, Severity};
use crate::notifier::DispatchSummary;

/// Logging options resolved by the binary before configuration is loaded
#[derive(Debug, Clone)]
pub struct LogOptions {
    /// File sink; console-only when `None` or when the file cannot be opened
    pub file: Option<PathBuf>,
    /// Emit JSON on the console instead of plain lines
    pub json: bool,
}

/// Install the global subscriber.
///
/// Filter comes from `RUST_LOG`, defaulting to `info`. The file sink is
/// always plain text.
pub fn init_logging(options: &LogOptions) -> anyhow::Result<()> {
    let mut file_error = None;
    let file_layer = options.file.as_deref().and_then(|path| match open_log_file(path) {
        Ok(file) => Some(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        ),
        Err(e) => {
            file_error = Some((path.to_path_buf(), e));
            None
        }
    });

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(options.json.then(|| fmt::layer().json()))
        .with((!options.json).then(fmt::layer))
        .with(file_layer)
        .try_init()?;

    if let Some((path, e)) = file_error {
        warn!(path = %path.display(), error = %e, "Could not open log file, logging to console only");
    }

    Ok(())
}

fn open_log_file(path: &Path) -> std::io::Result<std::fs::File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Structured logger for monitor events
///
/// Keeps field names consistent across the pass so log lines can be
/// grepped by `event`.
#[derive(Clone)]
pub struct StructuredLogger {
    host: String,
}

impl StructuredLogger {
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }

    /// Log process startup
    pub fn log_startup(&self, version: &str, command: &str) {
        info!(
            event = "monitor_started",
            host = %self.host,
            version = %version,
            command = %command,
            "Host monitor started"
        );
    }

    /// Log the per-metric result of a pass
    pub fn log_metric(&self, status: &MetricStatus) {
        match status {
            MetricStatus::Classified(metric) => match metric.severity {
                Severity::Normal => info!(
                    event = "metric_classified",
                    host = %self.host,
                    metric = %metric.sample.kind,
                    value = metric.sample.value,
                    severity = %metric.severity,
                    "{}",
                    metric.message
                ),
                Severity::Warning | Severity::Critical => warn!(
                    event = "metric_classified",
                    host = %self.host,
                    metric = %metric.sample.kind,
                    value = metric.sample.value,
                    severity = %metric.severity,
                    "{}",
                    metric.message
                ),
            },
            MetricStatus::Unavailable { kind, reason } => error!(
                event = "metric_unavailable",
                host = %self.host,
                metric = %kind,
                reason = %reason,
                "Metric unavailable for this pass"
            ),
        }
    }

    /// Log the alert decision of a pass
    pub fn log_decision(&self, decision: &AlertDecision) {
        info!(
            event = "alert_decision",
            host = %self.host,
            highest_severity = %decision.highest_severity,
            send_critical = decision.should_send_critical,
            send_warning = decision.should_send_warning,
            send_daily_report = decision.should_send_daily_report,
            "Alert decision computed"
        );
    }

    /// Log the outcome of dispatching notifications
    pub fn log_dispatch(&self, summary: &DispatchSummary) {
        if summary.all_delivered() {
            info!(
                event = "dispatch_complete",
                host = %self.host,
                delivered = summary.delivered.len(),
                "Notifications dispatched"
            );
        } else {
            warn!(
                event = "dispatch_complete",
                host = %self.host,
                delivered = summary.delivered.len(),
                failed = summary.failed.len(),
                "Some notifications could not be delivered"
            );
        }
    }

    /// Log pass completion
    pub fn log_pass_completed(&self, elapsed_ms: u128, dry_run: bool) {
        info!(
            event = "pass_completed",
            host = %self.host,
            elapsed_ms = elapsed_ms as u64,
            dry_run = dry_run,
            "Monitoring check completed"
        );
    }
}
