//! One monitoring pass: sample, classify, decide, notify.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::alert::AlertAggregator;
use crate::classifier::ThresholdClassifier;
use crate::models::{AlertDecision, MetricStatus};
use crate::notifier::{dispatch, DispatchSummary, Notifier};
use crate::observability::StructuredLogger;
use crate::sampler::{sample_all, MetricSampler};

/// Everything a pass observed and did
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassOutcome {
    pub metrics: Vec<MetricStatus>,
    pub decision: AlertDecision,
    /// `None` when dispatch was skipped (dry run)
    pub dispatch: Option<DispatchSummary>,
}

/// Wiring for a single pass. Holds borrowed collaborators only.
pub struct MonitorPass<'a> {
    sampler: &'a dyn MetricSampler,
    classifier: &'a ThresholdClassifier,
    aggregator: &'a AlertAggregator,
    notifier: &'a dyn Notifier,
    endpoint: &'a Url,
    logger: StructuredLogger,
}

impl<'a> MonitorPass<'a> {
    pub fn new(
        sampler: &'a dyn MetricSampler,
        classifier: &'a ThresholdClassifier,
        aggregator: &'a AlertAggregator,
        notifier: &'a dyn Notifier,
        endpoint: &'a Url,
    ) -> Self {
        Self {
            sampler,
            classifier,
            aggregator,
            notifier,
            endpoint,
            logger: StructuredLogger::new(aggregator.host().hostname.clone()),
        }
    }

    /// Run the pass for the given local hour. With `dry_run` the decision is
    /// computed but nothing is sent.
    pub async fn run(&self, current_hour: u32, dry_run: bool) -> PassOutcome {
        let start = Instant::now();

        let metrics: Vec<MetricStatus> = sample_all(self.sampler, self.endpoint)
            .await
            .into_iter()
            .map(|reading| self.classifier.classify_reading(reading))
            .collect();
        for status in &metrics {
            self.logger.log_metric(status);
        }

        let decision = self.aggregator.decide(&metrics, current_hour);
        self.logger.log_decision(&decision);

        let dispatch = if dry_run {
            None
        } else {
            let summary = dispatch(&decision, self.notifier).await;
            self.logger.log_dispatch(&summary);
            Some(summary)
        };

        self.logger
            .log_pass_completed(start.elapsed().as_millis(), dry_run);

        PassOutcome {
            metrics,
            decision,
            dispatch,
        }
    }
}
