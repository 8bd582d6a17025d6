//! Consolidated system report
//!
//! Every notification carries the full state of the pass, not just the
//! metric that breached.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::models::{ClassifiedMetric, MetricKind, MetricStatus, SampleDetail};

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Identity of the monitored host, detected once at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostInfo {
    pub hostname: String,
    pub os: String,
}

impl HostInfo {
    pub fn new(hostname: impl Into<String>, os: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            os: os.into(),
        }
    }

    pub fn detect() -> Self {
        Self {
            hostname: sysinfo::System::host_name().unwrap_or_else(|| "unknown".to_string()),
            os: sysinfo::System::long_os_version().unwrap_or_else(|| std::env::consts::OS.to_string()),
        }
    }
}

/// Render the report for one pass. Metrics appear in [`MetricKind::ALL`]
/// order; kinds missing from `statuses` are skipped.
pub fn render_report(host: &HostInfo, statuses: &[MetricStatus]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Host monitoring report");
    let _ = writeln!(out, "Host: {}", host.hostname);
    let _ = writeln!(out, "System: {}", host.os);

    for kind in MetricKind::ALL {
        let Some(status) = statuses.iter().find(|s| s.kind() == kind) else {
            continue;
        };
        let _ = writeln!(out);
        let _ = writeln!(out, "{}:", kind.label());
        match status {
            MetricStatus::Classified(metric) => write_metric(&mut out, metric),
            MetricStatus::Unavailable { reason, .. } => {
                let _ = writeln!(out, "- Status: UNAVAILABLE");
                let _ = writeln!(out, "- Error: {}", reason);
            }
        }
    }

    out
}

fn write_metric(out: &mut String, metric: &ClassifiedMetric) {
    match &metric.sample.detail {
        SampleDetail::Disk(disk) => {
            let _ = writeln!(out, "- Mount: {}", disk.mount_point);
            let _ = writeln!(out, "- Usage: {:.1}%", metric.sample.value);
            let _ = writeln!(out, "- Total: {:.2} GB", disk.total_bytes as f64 / GIB);
            let _ = writeln!(out, "- Free: {:.2} GB", disk.available_bytes as f64 / GIB);
        }
        SampleDetail::Load(load) => {
            let _ = writeln!(out, "- Load average (1m): {:.2}", load.load_average_1m);
            let _ = writeln!(out, "- CPU cores: {}", load.cores);
            let _ = writeln!(out, "- Load: {:.2}%", metric.sample.value);
        }
        SampleDetail::Endpoint(probe) => {
            let _ = writeln!(out, "- URL: {}", probe.url);
            let _ = writeln!(
                out,
                "- Reachable: {}",
                if probe.reachable { "yes" } else { "no" }
            );
            match probe.status_code {
                Some(code) => {
                    let _ = writeln!(out, "- Response code: {}", code);
                }
                None => {
                    let _ = writeln!(out, "- Response code: N/A");
                }
            }
            match probe.latency_seconds {
                Some(latency) => {
                    let _ = writeln!(out, "- Response time: {:.3} s", latency);
                }
                None => {
                    let _ = writeln!(out, "- Response time: N/A");
                }
            }
            if let Some(error) = &probe.error {
                let _ = writeln!(out, "- Error: {}", error);
            }
        }
        SampleDetail::Containers { running } => {
            let _ = writeln!(out, "- Running: {}", running);
        }
    }

    if metric.sample.kind.is_alerting() {
        let _ = writeln!(out, "- Status: {} ({})", metric.severity.tag(), metric.message);
    } else {
        let _ = writeln!(out, "- Status: INFO ({})", metric.message);
    }
}
