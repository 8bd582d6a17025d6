//! Host monitoring library
//!
//! This crate provides the core functionality for:
//! - Sampling disk usage, system load, a web endpoint and running containers
//! - Classifying samples against warning/critical thresholds
//! - Aggregating one pass into an alert decision
//! - Dispatching alerts and daily reports by email
//! - Configuration loading and structured logging

pub mod alert;
pub mod classifier;
pub mod config;
pub mod error;
pub mod models;
pub mod notifier;
pub mod observability;
pub mod pass;
pub mod sampler;

pub use classifier::{classify, Classification, Threshold, ThresholdClassifier, ThresholdSet};
pub use config::{MonitorConfig, SmtpSettings};
pub use error::{ConfigurationError, DeliveryError, SampleError};
pub use models::*;
pub use observability::StructuredLogger;
pub use pass::{MonitorPass, PassOutcome};
