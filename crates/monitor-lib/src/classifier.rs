//! Threshold classification
//!
//! Maps a raw metric value to a [`Severity`] using per-metric
//! warning/critical thresholds. Both bounds are inclusive: a value equal to
//! a threshold counts as a breach of that tier.

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::ConfigurationError;
use crate::models::{
    ClassifiedMetric, MetricKind, MetricReading, MetricSample, MetricStatus, SampleDetail, Severity,
};

/// Warning/critical boundary pair for one metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub warning: f64,
    pub critical: f64,
}

impl Threshold {
    /// Build a threshold, rejecting non-finite values and `warning > critical`
    pub fn new(metric: MetricKind, warning: f64, critical: f64) -> Result<Self, ConfigurationError> {
        let threshold = Self { warning, critical };
        threshold.validate(metric)?;
        Ok(threshold)
    }

    pub fn validate(&self, metric: MetricKind) -> Result<(), ConfigurationError> {
        if !self.warning.is_finite() || !self.critical.is_finite() || !self.is_ordered() {
            return Err(ConfigurationError::ThresholdOrder {
                metric,
                warning: self.warning,
                critical: self.critical,
            });
        }
        Ok(())
    }

    pub fn is_ordered(&self) -> bool {
        self.warning <= self.critical
    }
}

/// Classify a value against a threshold.
///
/// When the pair is out of order the warning tier is ignored, so anything at
/// or above `critical` is still Critical and nothing is downgraded.
pub fn classify(value: f64, threshold: &Threshold) -> Severity {
    if value >= threshold.critical {
        Severity::Critical
    } else if threshold.is_ordered() && value >= threshold.warning {
        Severity::Warning
    } else {
        Severity::Normal
    }
}

/// Thresholds for every threshold-driven metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSet {
    pub disk: Threshold,
    pub load: Threshold,
}

impl Default for ThresholdSet {
    fn default() -> Self {
        Self {
            disk: Threshold {
                warning: 80.0,
                critical: 90.0,
            },
            load: Threshold {
                warning: 70.0,
                critical: 90.0,
            },
        }
    }
}

impl ThresholdSet {
    pub fn for_metric(&self, kind: MetricKind) -> Option<&Threshold> {
        match kind {
            MetricKind::DiskUsage => Some(&self.disk),
            MetricKind::SystemLoad => Some(&self.load),
            MetricKind::Endpoint | MetricKind::Containers => None,
        }
    }
}

/// Severity plus any configuration problem found while classifying
#[derive(Debug)]
pub struct Classification {
    pub severity: Severity,
    pub config_error: Option<ConfigurationError>,
}

/// Classifies samples using the thresholds configured at startup
#[derive(Debug, Clone)]
pub struct ThresholdClassifier {
    thresholds: ThresholdSet,
}

impl ThresholdClassifier {
    pub fn new(thresholds: ThresholdSet) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ThresholdSet {
        &self.thresholds
    }

    /// Classify a numeric value for a threshold-driven metric.
    ///
    /// Metrics without thresholds classify as Normal.
    pub fn classify(&self, kind: MetricKind, value: f64) -> Classification {
        let Some(threshold) = self.thresholds.for_metric(kind) else {
            return Classification {
                severity: Severity::Normal,
                config_error: None,
            };
        };

        Classification {
            severity: classify(value, threshold),
            config_error: threshold.validate(kind).err(),
        }
    }

    /// Turn a raw reading into the per-metric status of the pass
    pub fn classify_reading(&self, reading: MetricReading) -> MetricStatus {
        match reading.result {
            Ok(sample) => MetricStatus::Classified(self.classify_sample(sample)),
            Err(e) => MetricStatus::Unavailable {
                kind: reading.kind,
                reason: e.to_string(),
            },
        }
    }

    pub fn classify_sample(&self, sample: MetricSample) -> ClassifiedMetric {
        let severity = match &sample.detail {
            SampleDetail::Endpoint(probe) => {
                if probe.reachable {
                    Severity::Normal
                } else {
                    Severity::Critical
                }
            }
            SampleDetail::Containers { .. } => Severity::Normal,
            SampleDetail::Disk(_) | SampleDetail::Load(_) => {
                let classification = self.classify(sample.kind, sample.value);
                if let Some(e) = &classification.config_error {
                    error!(metric = %sample.kind, error = %e, "Misconfigured thresholds, warning tier disabled");
                }
                classification.severity
            }
        };

        let message = describe(&sample, severity);
        ClassifiedMetric {
            sample,
            severity,
            message,
        }
    }
}

fn describe(sample: &MetricSample, severity: Severity) -> String {
    match &sample.detail {
        SampleDetail::Disk(_) => match severity {
            Severity::Critical => "Disk space critically low".to_string(),
            Severity::Warning => "Disk space running low".to_string(),
            Severity::Normal => "Disk space OK".to_string(),
        },
        SampleDetail::Load(_) => match severity {
            Severity::Critical => "System load critical".to_string(),
            Severity::Warning => "System load high".to_string(),
            Severity::Normal => "System load OK".to_string(),
        },
        SampleDetail::Endpoint(probe) => {
            if probe.reachable {
                "Web endpoint online".to_string()
            } else {
                match probe.status_code {
                    Some(code) => format!("Web endpoint returned HTTP {}", code),
                    None => "Web endpoint unreachable".to_string(),
                }
            }
        }
        SampleDetail::Containers { running } => format!("{} containers running", running),
    }
}
