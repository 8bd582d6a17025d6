//! Monitor configuration
//!
//! Settings come from the process environment, optionally seeded from a
//! dotenv file. Thresholds fall back to documented defaults; SMTP
//! credentials and the monitored URL never do.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::classifier::{Threshold, ThresholdSet};
use crate::error::ConfigurationError;
use crate::models::MetricKind;

pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_DISK_PATH: &str = "/";
pub const DEFAULT_DOCKER_BINARY: &str = "docker";
pub const DEFAULT_LOG_FILE: &str = "/tmp/host-monitor.log";
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;

const DEFAULT_DISK_WARNING: f64 = 80.0;
const DEFAULT_DISK_CRITICAL: f64 = 90.0;
const DEFAULT_LOAD_WARNING: f64 = 70.0;
const DEFAULT_LOAD_CRITICAL: f64 = 90.0;

/// Raw key/value settings. Keys are the lower-cased environment names.
#[derive(Debug, Default, Deserialize)]
struct RawSettings {
    email_smtp_server: Option<String>,
    email_smtp_port: Option<String>,
    email_sender: Option<String>,
    email_password: Option<String>,
    admin_emails: Option<String>,
    monitoring_website_url: Option<String>,
    disk_space_critical_threshold: Option<String>,
    disk_space_warning_threshold: Option<String>,
    system_load_critical_threshold: Option<String>,
    system_load_warning_threshold: Option<String>,
    monitoring_disk_path: Option<String>,
    monitoring_probe_timeout_secs: Option<String>,
    monitoring_docker_bin: Option<String>,
    monitoring_log_file: Option<String>,
}

/// SMTP connection and addressing
#[derive(Clone)]
pub struct SmtpSettings {
    pub server: String,
    pub port: u16,
    pub sender: String,
    pub password: String,
    pub recipients: Vec<String>,
}

// Keep the password out of logs
impl std::fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("sender", &self.sender)
            .field("password", &"<redacted>")
            .field("recipients", &self.recipients)
            .finish()
    }
}

impl SmtpSettings {
    /// Load only the SMTP settings from the process environment
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_source(config::Environment::default())
    }

    pub fn from_source<S>(source: S) -> Result<Self, ConfigurationError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        Self::from_raw(&read_raw(source)?)
    }

    fn from_raw(raw: &RawSettings) -> Result<Self, ConfigurationError> {
        let server = required("EMAIL_SMTP_SERVER", &raw.email_smtp_server)?;
        let port = match non_empty(&raw.email_smtp_port) {
            Some(value) => value.parse::<u16>().map_err(|e| ConfigurationError::Invalid {
                key: "EMAIL_SMTP_PORT",
                value: value.to_string(),
                reason: e.to_string(),
            })?,
            None => DEFAULT_SMTP_PORT,
        };
        let sender = required("EMAIL_SENDER", &raw.email_sender)?;
        let password = required("EMAIL_PASSWORD", &raw.email_password)?;

        let recipients: Vec<String> = required("ADMIN_EMAILS", &raw.admin_emails)?
            .split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .collect();
        if recipients.is_empty() {
            return Err(ConfigurationError::Missing { key: "ADMIN_EMAILS" });
        }

        for (key, address) in std::iter::once(("EMAIL_SENDER", &sender))
            .chain(recipients.iter().map(|r| ("ADMIN_EMAILS", r)))
        {
            address
                .parse::<lettre::message::Mailbox>()
                .map_err(|e| ConfigurationError::Invalid {
                    key,
                    value: address.clone(),
                    reason: e.to_string(),
                })?;
        }

        Ok(Self {
            server,
            port,
            sender,
            password,
            recipients,
        })
    }
}

/// Complete configuration for one monitoring pass
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub smtp: SmtpSettings,
    pub website_url: Url,
    pub thresholds: ThresholdSet,
    pub disk_path: PathBuf,
    pub probe_timeout: Duration,
    pub docker_binary: String,
    pub log_file: PathBuf,
}

impl MonitorConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_source(config::Environment::default())
    }

    /// Load configuration from any `config` source (used by tests)
    pub fn from_source<S>(source: S) -> Result<Self, ConfigurationError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let raw = read_raw(source)?;
        let smtp = SmtpSettings::from_raw(&raw)?;

        let url_value = required("MONITORING_WEBSITE_URL", &raw.monitoring_website_url)?;
        let website_url = Url::parse(&url_value).map_err(|e| ConfigurationError::Invalid {
            key: "MONITORING_WEBSITE_URL",
            value: url_value.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(website_url.scheme(), "http" | "https") {
            return Err(ConfigurationError::Invalid {
                key: "MONITORING_WEBSITE_URL",
                value: url_value,
                reason: "scheme must be http or https".to_string(),
            });
        }

        let disk_warning = number(
            "DISK_SPACE_WARNING_THRESHOLD",
            &raw.disk_space_warning_threshold,
            DEFAULT_DISK_WARNING,
        )?;
        let disk_critical = number(
            "DISK_SPACE_CRITICAL_THRESHOLD",
            &raw.disk_space_critical_threshold,
            DEFAULT_DISK_CRITICAL,
        )?;
        let load_warning = number(
            "SYSTEM_LOAD_WARNING_THRESHOLD",
            &raw.system_load_warning_threshold,
            DEFAULT_LOAD_WARNING,
        )?;
        let load_critical = number(
            "SYSTEM_LOAD_CRITICAL_THRESHOLD",
            &raw.system_load_critical_threshold,
            DEFAULT_LOAD_CRITICAL,
        )?;
        let thresholds = ThresholdSet {
            disk: Threshold::new(MetricKind::DiskUsage, disk_warning, disk_critical)?,
            load: Threshold::new(MetricKind::SystemLoad, load_warning, load_critical)?,
        };

        let probe_timeout = match non_empty(&raw.monitoring_probe_timeout_secs) {
            Some(value) => match value.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigurationError::Invalid {
                        key: "MONITORING_PROBE_TIMEOUT_SECS",
                        value: value.to_string(),
                        reason: "expected a positive number of seconds".to_string(),
                    })
                }
            },
            None => Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
        };

        Ok(Self {
            smtp,
            website_url,
            thresholds,
            disk_path: PathBuf::from(
                non_empty(&raw.monitoring_disk_path).unwrap_or(DEFAULT_DISK_PATH),
            ),
            probe_timeout,
            docker_binary: non_empty(&raw.monitoring_docker_bin)
                .unwrap_or(DEFAULT_DOCKER_BINARY)
                .to_string(),
            log_file: PathBuf::from(
                non_empty(&raw.monitoring_log_file).unwrap_or(DEFAULT_LOG_FILE),
            ),
        })
    }
}

/// Log file location, readable before the full configuration is validated
pub fn log_file_from_env() -> PathBuf {
    std::env::var("MONITORING_LOG_FILE")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE))
}

/// Seed the process environment from a dotenv file. Variables already set
/// take precedence. Returns `false` when the file does not exist.
pub fn load_env_file(path: &Path) -> Result<bool, ConfigurationError> {
    if !path.exists() {
        debug!(path = %path.display(), "Env file not found, using process environment only");
        return Ok(false);
    }
    dotenvy::from_path(path).map_err(|e| ConfigurationError::Invalid {
        key: "env file",
        value: path.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(true)
}

fn read_raw<S>(source: S) -> Result<RawSettings, ConfigurationError>
where
    S: config::Source + Send + Sync + 'static,
{
    let settings = config::Config::builder().add_source(source).build()?;
    Ok(settings.try_deserialize()?)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn required(key: &'static str, value: &Option<String>) -> Result<String, ConfigurationError> {
    non_empty(value)
        .map(str::to_string)
        .ok_or(ConfigurationError::Missing { key })
}

fn number(key: &'static str, value: &Option<String>, default: f64) -> Result<f64, ConfigurationError> {
    let Some(value) = non_empty(value) else {
        return Ok(default);
    };
    match value.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => Err(ConfigurationError::Invalid {
            key,
            value: value.to_string(),
            reason: "expected a number".to_string(),
        }),
    }
}
