//! Web endpoint probe

use std::time::{Duration, Instant};

use tracing::debug;
use url::Url;

use crate::error::SampleError;
use crate::models::EndpointProbe;

/// HTTP GET prober. The timeout bounds the whole request so a hung endpoint
/// cannot stall the pass. The monitored endpoint is local,
/// so proxy settings from the environment are ignored.
pub struct EndpointProber {
    client: reqwest::Client,
}

impl EndpointProber {
    pub fn new(timeout: Duration) -> Result<Self, SampleError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .no_proxy()
            .build()
            .map_err(|e| SampleError::ProbeSetup(e.to_string()))?;
        Ok(Self { client })
    }

    /// Probe `url`. Transport failures (timeout, refused connection, TLS)
    /// yield an unreachable probe rather than an error.
    pub async fn probe(&self, url: &Url) -> EndpointProbe {
        let start = Instant::now();

        match self.client.get(url.clone()).send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                let latency = start.elapsed().as_secs_f64();
                debug!(url = %url, status, latency_secs = latency, "Endpoint responded");
                EndpointProbe {
                    url: url.to_string(),
                    status_code: Some(status),
                    reachable: EndpointProbe::is_success_status(status),
                    latency_seconds: Some(latency),
                    error: None,
                }
            }
            Err(e) => {
                debug!(url = %url, error = %e, "Endpoint probe failed");
                EndpointProbe {
                    url: url.to_string(),
                    status_code: e.status().map(|s| s.as_u16()),
                    reachable: false,
                    latency_seconds: None,
                    error: Some(describe_transport_error(&e)),
                }
            }
        }
    }
}

fn describe_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("request timed out: {}", e)
    } else if e.is_connect() {
        format!("connection failed: {}", e)
    } else {
        e.to_string()
    }
}
