//! Alert decisions for a monitoring pass
//!
//! This module provides:
//! - Severity aggregation across the metrics of one pass
//! - The daily report policy (fires at midnight)
//! - The consolidated text report embedded in every notification

mod aggregator;
mod report;

pub use aggregator::{AlertAggregator, DAILY_REPORT_HOUR};
pub use report::{render_report, HostInfo};
