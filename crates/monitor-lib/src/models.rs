//! Core data models for the host monitor

use serde::{Deserialize, Serialize};

/// The metrics sampled on every pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    DiskUsage,
    SystemLoad,
    Endpoint,
    Containers,
}

impl MetricKind {
    /// All kinds in report order
    pub const ALL: [MetricKind; 4] = [
        MetricKind::DiskUsage,
        MetricKind::SystemLoad,
        MetricKind::Endpoint,
        MetricKind::Containers,
    ];

    /// Stable machine name
    pub fn name(&self) -> &'static str {
        match self {
            MetricKind::DiskUsage => "disk_usage",
            MetricKind::SystemLoad => "system_load",
            MetricKind::Endpoint => "endpoint",
            MetricKind::Containers => "containers",
        }
    }

    /// Human-readable label used in reports and email subjects
    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::DiskUsage => "Disk usage",
            MetricKind::SystemLoad => "System load",
            MetricKind::Endpoint => "Web endpoint",
            MetricKind::Containers => "Containers",
        }
    }

    pub fn unit(&self) -> Unit {
        match self {
            MetricKind::DiskUsage | MetricKind::SystemLoad => Unit::Percent,
            MetricKind::Endpoint => Unit::HttpStatus,
            MetricKind::Containers => Unit::Count,
        }
    }

    /// Whether this metric can trigger an alert. Container count is
    /// informational only.
    pub fn is_alerting(&self) -> bool {
        !matches!(self, MetricKind::Containers)
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Percent,
    Count,
    Boolean,
    HttpStatus,
}

/// Breach level of a metric. Ordered so the worst of a pass is `max()`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Normal,
    Warning,
    Critical,
}

impl Severity {
    /// Upper-case tag used in email subjects and reports
    pub fn tag(&self) -> &'static str {
        match self {
            Severity::Normal => "NORMAL",
            Severity::Warning => "WARNING",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Normal => write!(f, "normal"),
            Severity::Warning => write!(f, "warning"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// Disk usage of the filesystem holding the monitored path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskUsage {
    pub mount_point: String,
    pub total_bytes: u64,
    pub available_bytes: u64,
}

impl DiskUsage {
    pub fn used_bytes(&self) -> u64 {
        self.total_bytes.saturating_sub(self.available_bytes)
    }

    /// Used share of the filesystem in percent
    pub fn percent(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        self.used_bytes() as f64 / self.total_bytes as f64 * 100.0
    }
}

/// One-minute load average and the core count it is normalized by
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadSnapshot {
    pub load_average_1m: f64,
    pub cores: usize,
}

impl LoadSnapshot {
    pub fn percent(&self) -> f64 {
        if self.cores == 0 {
            return 0.0;
        }
        self.load_average_1m / self.cores as f64 * 100.0
    }
}

/// Result of probing the monitored web endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointProbe {
    pub url: String,
    pub status_code: Option<u16>,
    pub reachable: bool,
    pub latency_seconds: Option<f64>,
    /// Transport error when no response was received
    pub error: Option<String>,
}

impl EndpointProbe {
    /// A response counts as reachable when its status is 2xx or 3xx
    pub fn is_success_status(status: u16) -> bool {
        (200..400).contains(&status)
    }
}

/// Metric-specific context captured alongside the numeric value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SampleDetail {
    Disk(DiskUsage),
    Load(LoadSnapshot),
    Endpoint(EndpointProbe),
    Containers { running: u64 },
}

/// A single measurement taken during a pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub kind: MetricKind,
    pub value: f64,
    pub unit: Unit,
    pub detail: SampleDetail,
}

impl MetricSample {
    pub fn disk(usage: DiskUsage) -> Self {
        Self {
            kind: MetricKind::DiskUsage,
            value: usage.percent(),
            unit: Unit::Percent,
            detail: SampleDetail::Disk(usage),
        }
    }

    pub fn load(snapshot: LoadSnapshot) -> Self {
        Self {
            kind: MetricKind::SystemLoad,
            value: snapshot.percent(),
            unit: Unit::Percent,
            detail: SampleDetail::Load(snapshot),
        }
    }

    /// Endpoint samples carry the status code, or a 0/1 reachability flag
    /// when no response was received.
    pub fn endpoint(probe: EndpointProbe) -> Self {
        let (value, unit) = match probe.status_code {
            Some(code) => (f64::from(code), Unit::HttpStatus),
            None => (if probe.reachable { 1.0 } else { 0.0 }, Unit::Boolean),
        };
        Self {
            kind: MetricKind::Endpoint,
            value,
            unit,
            detail: SampleDetail::Endpoint(probe),
        }
    }

    pub fn containers(running: u64) -> Self {
        Self {
            kind: MetricKind::Containers,
            value: running as f64,
            unit: Unit::Count,
            detail: SampleDetail::Containers { running },
        }
    }

    /// Endpoint probe details, if this is an endpoint sample
    pub fn endpoint_probe(&self) -> Option<&EndpointProbe> {
        match &self.detail {
            SampleDetail::Endpoint(probe) => Some(probe),
            _ => None,
        }
    }
}

/// Raw outcome of sampling one metric
#[derive(Debug)]
pub struct MetricReading {
    pub kind: MetricKind,
    pub result: Result<MetricSample, crate::error::SampleError>,
}

/// A sample with its severity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedMetric {
    pub sample: MetricSample,
    pub severity: Severity,
    pub message: String,
}

/// Per-metric state of a pass after classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MetricStatus {
    Classified(ClassifiedMetric),
    Unavailable { kind: MetricKind, reason: String },
}

impl MetricStatus {
    pub fn kind(&self) -> MetricKind {
        match self {
            MetricStatus::Classified(metric) => metric.sample.kind,
            MetricStatus::Unavailable { kind, .. } => *kind,
        }
    }

    pub fn as_classified(&self) -> Option<&ClassifiedMetric> {
        match self {
            MetricStatus::Classified(metric) => Some(metric),
            MetricStatus::Unavailable { .. } => None,
        }
    }
}

/// What a pass should send
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertDecision {
    pub should_send_critical: bool,
    pub should_send_warning: bool,
    pub should_send_daily_report: bool,
    /// Worst severity among alerting metrics that could be measured
    pub highest_severity: Severity,
    pub critical_metrics: Vec<MetricKind>,
    pub warning_metrics: Vec<MetricKind>,
    /// Consolidated report covering every metric of the pass
    pub payload: String,
}

impl AlertDecision {
    pub fn is_quiet(&self) -> bool {
        !self.should_send_critical && !self.should_send_warning && !self.should_send_daily_report
    }
}
