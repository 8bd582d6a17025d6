//! Error taxonomy for sampling, configuration and delivery

use crate::models::MetricKind;

/// A metric could not be measured during a pass.
///
/// Sampling errors are absorbed per metric: the pass continues and the
/// metric is reported as unavailable.
#[derive(Debug, thiserror::Error)]
pub enum SampleError {
    #[error("no mounted filesystem contains {path}")]
    NoFilesystem { path: String },

    #[error("filesystem mounted at {mount} reports zero capacity")]
    ZeroCapacity { mount: String },

    #[error("no CPU cores reported by the host")]
    NoCpus,

    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("endpoint probe could not be started: {0}")]
    ProbeSetup(String),
}

/// Missing or invalid configuration. Fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("required setting {key} is missing")]
    Missing { key: &'static str },

    #[error("setting {key} has invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("{metric} thresholds are out of order: warning {warning} > critical {critical}")]
    ThresholdOrder {
        metric: MetricKind,
        warning: f64,
        critical: f64,
    },

    #[error("failed to read configuration source: {0}")]
    Source(#[from] config::ConfigError),
}

/// A notification could not be delivered.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// SMTP transport-level failure (connection, STARTTLS, authentication).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The sender or a recipient address could not be parsed.
    #[error("email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("email build error: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("no recipients configured")]
    NoRecipients,

    /// Failure reported by a non-SMTP notifier.
    #[error("delivery failed: {0}")]
    Other(String),
}
