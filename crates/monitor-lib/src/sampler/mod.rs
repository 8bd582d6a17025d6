//! Metric sampling from the host
//!
//! This module provides samplers for:
//! - Disk usage of the filesystem holding a path (sysinfo)
//! - One-minute load average normalized by core count (sysinfo)
//! - Reachability of a web endpoint (reqwest, bounded timeout)
//! - Running container count (`docker ps -q`)

mod docker;
mod endpoint;
mod system;

#[cfg(test)]
mod tests;

pub use docker::{count_container_ids, DockerCounter};
pub use endpoint::EndpointProber;
pub use system::{select_filesystem, FilesystemEntry};

use crate::error::SampleError;
use crate::models::{
    DiskUsage, EndpointProbe, LoadSnapshot, MetricKind, MetricReading, MetricSample,
};
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tracing::error;
use url::Url;

/// Trait for host metric sampling implementations
#[async_trait]
pub trait MetricSampler: Send + Sync {
    /// Usage of the filesystem holding the monitored path
    async fn sample_disk_usage(&self) -> Result<DiskUsage, SampleError>;

    /// One-minute load average with the core count used to normalize it
    async fn sample_load(&self) -> Result<LoadSnapshot, SampleError>;

    /// Probe a web endpoint. An unreachable endpoint is a successful probe
    /// with `reachable == false`; `Err` means no probe could be made.
    async fn probe_endpoint(&self, url: &Url) -> Result<EndpointProbe, SampleError>;

    /// Number of running containers
    async fn sample_container_count(&self) -> Result<u64, SampleError>;
}

/// Sampler backed by the local host
pub struct HostSampler {
    disk_path: PathBuf,
    // Setup failure is reported on each probe, not at construction
    prober: Result<EndpointProber, String>,
    docker: DockerCounter,
}

impl HostSampler {
    pub fn new(
        disk_path: impl Into<PathBuf>,
        probe_timeout: Duration,
        docker_binary: impl Into<String>,
    ) -> Self {
        Self::with_prober(disk_path, EndpointProber::new(probe_timeout), docker_binary)
    }

    pub(crate) fn with_prober(
        disk_path: impl Into<PathBuf>,
        prober: Result<EndpointProber, SampleError>,
        docker_binary: impl Into<String>,
    ) -> Self {
        let prober = prober.map_err(|e| {
            error!(error = %e, "Endpoint prober unavailable");
            match e {
                SampleError::ProbeSetup(reason) => reason,
                other => other.to_string(),
            }
        });
        Self {
            disk_path: disk_path.into(),
            prober,
            docker: DockerCounter::new(docker_binary),
        }
    }
}

#[async_trait]
impl MetricSampler for HostSampler {
    async fn sample_disk_usage(&self) -> Result<DiskUsage, SampleError> {
        system::disk_usage(&self.disk_path)
    }

    async fn sample_load(&self) -> Result<LoadSnapshot, SampleError> {
        system::load()
    }

    async fn probe_endpoint(&self, url: &Url) -> Result<EndpointProbe, SampleError> {
        match &self.prober {
            Ok(prober) => Ok(prober.probe(url).await),
            Err(reason) => Err(SampleError::ProbeSetup(reason.clone())),
        }
    }

    async fn sample_container_count(&self) -> Result<u64, SampleError> {
        self.docker.count_running().await
    }
}

/// Sample every metric once. A failure on one metric never prevents the
/// others from being sampled.
pub async fn sample_all(sampler: &dyn MetricSampler, endpoint: &Url) -> Vec<MetricReading> {
    let readings = vec![
        MetricReading {
            kind: MetricKind::DiskUsage,
            result: sampler.sample_disk_usage().await.map(MetricSample::disk),
        },
        MetricReading {
            kind: MetricKind::SystemLoad,
            result: sampler.sample_load().await.map(MetricSample::load),
        },
        MetricReading {
            kind: MetricKind::Endpoint,
            result: sampler.probe_endpoint(endpoint).await.map(MetricSample::endpoint),
        },
        MetricReading {
            kind: MetricKind::Containers,
            result: sampler
                .sample_container_count()
                .await
                .map(MetricSample::containers),
        },
    ];

    for reading in &readings {
        if let Err(e) = &reading.result {
            error!(metric = %reading.kind, error = %e, "Failed to sample metric");
        }
    }

    readings
}
