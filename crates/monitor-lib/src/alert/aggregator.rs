//! Severity aggregation and notification policy
//!
//! One decision is computed per pass from every metric status plus the
//! current hour. There is no state between passes: a condition that
//! persists is re-alerted on every run.

use super::report::{render_report, HostInfo};
use crate::models::{AlertDecision, ClassifiedMetric, MetricKind, MetricStatus, Severity};

/// Hour of day (local time) at which the daily report is sent
pub const DAILY_REPORT_HOUR: u32 = 0;

/// Decides what a pass should send
#[derive(Debug, Clone)]
pub struct AlertAggregator {
    host: HostInfo,
}

impl AlertAggregator {
    pub fn new(host: HostInfo) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &HostInfo {
        &self.host
    }

    /// Compute the alert decision for one pass.
    ///
    /// Only alerting metrics (disk, load, endpoint) contribute severity.
    /// Unavailable metrics, the endpoint included, are excluded but still
    /// appear in the payload.
    pub fn decide(&self, statuses: &[MetricStatus], current_hour: u32) -> AlertDecision {
        let mut critical_metrics = Vec::new();
        let mut warning_metrics = Vec::new();
        let mut highest_severity = Severity::Normal;

        for metric in statuses.iter().filter_map(MetricStatus::as_classified) {
            if !metric.sample.kind.is_alerting() {
                continue;
            }
            let severity = effective_severity(metric);
            highest_severity = highest_severity.max(severity);
            match severity {
                Severity::Critical => push_unique(&mut critical_metrics, metric.sample.kind),
                Severity::Warning => push_unique(&mut warning_metrics, metric.sample.kind),
                Severity::Normal => {}
            }
        }

        AlertDecision {
            should_send_critical: !critical_metrics.is_empty(),
            should_send_warning: !warning_metrics.is_empty(),
            should_send_daily_report: current_hour == DAILY_REPORT_HOUR,
            highest_severity,
            critical_metrics,
            warning_metrics,
            payload: render_report(&self.host, statuses),
        }
    }
}

/// An unreachable endpoint is critical whatever severity was recorded.
fn effective_severity(metric: &ClassifiedMetric) -> Severity {
    match metric.sample.endpoint_probe() {
        Some(probe) if !probe.reachable => Severity::Critical,
        _ => metric.severity,
    }
}

fn push_unique(kinds: &mut Vec<MetricKind>, kind: MetricKind) {
    if !kinds.contains(&kind) {
        kinds.push(kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{ThresholdClassifier, ThresholdSet};
    use crate::models::{DiskUsage, EndpointProbe, LoadSnapshot, MetricSample};

    fn aggregator() -> AlertAggregator {
        AlertAggregator::new(HostInfo::new("test-host", "TestOS 1.0"))
    }

    fn classifier() -> ThresholdClassifier {
        ThresholdClassifier::new(ThresholdSet::default())
    }

    fn disk(percent_used: u64) -> MetricStatus {
        MetricStatus::Classified(classifier().classify_sample(MetricSample::disk(DiskUsage {
            mount_point: "/".to_string(),
            total_bytes: 100,
            available_bytes: 100 - percent_used,
        })))
    }

    fn load(load_average_1m: f64, cores: usize) -> MetricStatus {
        MetricStatus::Classified(classifier().classify_sample(MetricSample::load(LoadSnapshot {
            load_average_1m,
            cores,
        })))
    }

    fn endpoint(status_code: Option<u16>, reachable: bool) -> MetricStatus {
        MetricStatus::Classified(classifier().classify_sample(MetricSample::endpoint(
            EndpointProbe {
                url: "http://localhost:3000".to_string(),
                status_code,
                reachable,
                latency_seconds: status_code.map(|_| 0.05),
                error: if reachable {
                    None
                } else {
                    Some("connection refused".to_string())
                },
            },
        )))
    }

    fn containers(running: u64) -> MetricStatus {
        MetricStatus::Classified(classifier().classify_sample(MetricSample::containers(running)))
    }

    fn healthy_pass() -> Vec<MetricStatus> {
        vec![
            disk(40),
            load(0.5, 4),
            endpoint(Some(200), true),
            containers(2),
        ]
    }

    #[test]
    fn test_all_normal_outside_midnight_sends_nothing() {
        let decision = aggregator().decide(&healthy_pass(), 14);

        assert!(!decision.should_send_critical);
        assert!(!decision.should_send_warning);
        assert!(!decision.should_send_daily_report);
        assert!(decision.is_quiet());
        assert_eq!(decision.highest_severity, Severity::Normal);
    }

    #[test]
    fn test_critical_disk_triggers_critical_send() {
        let statuses = vec![
            disk(95),
            load(0.5, 4),
            endpoint(Some(200), true),
            containers(2),
        ];

        let decision = aggregator().decide(&statuses, 10);

        assert!(decision.should_send_critical);
        assert!(!decision.should_send_warning);
        assert_eq!(decision.critical_metrics, vec![MetricKind::DiskUsage]);
        assert_eq!(decision.highest_severity, Severity::Critical);
        assert!(decision.payload.contains("- Usage: 95.0%"));
        // Consolidated: non-breaching metrics are reported too
        assert!(decision.payload.contains("- Load: 12.50%"));
        assert!(decision.payload.contains("- Running: 2"));
    }

    #[test]
    fn test_unreachable_endpoint_is_always_critical() {
        let statuses = vec![
            disk(10),
            load(0.1, 8),
            endpoint(None, false),
            containers(0),
        ];

        let decision = aggregator().decide(&statuses, 9);

        assert!(decision.should_send_critical);
        assert_eq!(decision.critical_metrics, vec![MetricKind::Endpoint]);
    }

    #[test]
    fn test_unreachable_endpoint_overrides_recorded_severity() {
        let statuses = vec![MetricStatus::Classified(ClassifiedMetric {
            sample: MetricSample::endpoint(EndpointProbe {
                url: "http://localhost:3000".to_string(),
                status_code: Some(500),
                reachable: false,
                latency_seconds: Some(0.01),
                error: None,
            }),
            severity: Severity::Normal,
            message: "hand-built".to_string(),
        })];

        let decision = aggregator().decide(&statuses, 9);

        assert!(decision.should_send_critical);
    }

    #[test]
    fn test_midnight_with_all_normal_sends_only_daily_report() {
        let decision = aggregator().decide(&healthy_pass(), 0);

        assert!(decision.should_send_daily_report);
        assert!(!decision.should_send_critical);
        assert!(!decision.should_send_warning);
        assert!(decision.payload.contains("Host: test-host"));
    }

    #[test]
    fn test_daily_report_co_occurs_with_alerts() {
        let statuses = vec![disk(95), load(3.0, 4), endpoint(Some(200), true)];

        let decision = aggregator().decide(&statuses, 0);

        assert!(decision.should_send_critical);
        assert!(decision.should_send_warning);
        assert!(decision.should_send_daily_report);
        assert_eq!(decision.warning_metrics, vec![MetricKind::SystemLoad]);
    }

    #[test]
    fn test_warning_and_critical_flags_are_independent() {
        let statuses = vec![disk(85), load(1.0, 4), endpoint(Some(301), true)];

        let decision = aggregator().decide(&statuses, 3);

        assert!(!decision.should_send_critical);
        assert!(decision.should_send_warning);
        assert_eq!(decision.highest_severity, Severity::Warning);
        assert_eq!(decision.warning_metrics, vec![MetricKind::DiskUsage]);
    }

    #[test]
    fn test_containers_never_trigger_alerts() {
        let statuses = vec![MetricStatus::Classified(ClassifiedMetric {
            sample: MetricSample::containers(10_000),
            severity: Severity::Critical,
            message: "forced".to_string(),
        })];

        let decision = aggregator().decide(&statuses, 5);

        assert!(decision.is_quiet());
        assert_eq!(decision.highest_severity, Severity::Normal);
    }

    #[test]
    fn test_unavailable_disk_is_excluded_and_marked() {
        let statuses = vec![
            MetricStatus::Unavailable {
                kind: MetricKind::DiskUsage,
                reason: "no mounted filesystem contains /".to_string(),
            },
            load(0.2, 2),
            endpoint(Some(200), true),
        ];

        let decision = aggregator().decide(&statuses, 11);

        assert!(decision.is_quiet());
        assert!(decision
            .payload
            .contains("Disk usage:\n- Status: UNAVAILABLE\n- Error: no mounted filesystem contains /"));
    }

    #[test]
    fn test_unavailable_endpoint_is_excluded_like_other_metrics() {
        let statuses = vec![
            disk(40),
            load(0.2, 2),
            MetricStatus::Unavailable {
                kind: MetricKind::Endpoint,
                reason: "endpoint probe could not be started: no TLS backend".to_string(),
            },
        ];

        let decision = aggregator().decide(&statuses, 11);

        assert!(!decision.should_send_critical);
        assert!(decision.critical_metrics.is_empty());
        assert!(decision
            .payload
            .contains("Web endpoint:\n- Status: UNAVAILABLE"));
    }

    #[test]
    fn test_empty_pass_is_quiet() {
        let decision = aggregator().decide(&[], 12);
        assert!(decision.is_quiet());
    }
}
