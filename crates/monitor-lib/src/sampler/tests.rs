//! Tests for host sampling
//!
//! The endpoint prober is exercised against a throwaway local HTTP listener
//! and the docker counter against stock unix binaries, so no container
//! runtime or network access is needed.

#[cfg(test)]
mod sampling_tests {
    use crate::error::SampleError;
    use crate::models::{DiskUsage, EndpointProbe, LoadSnapshot, MetricKind};
    use crate::sampler::{
        count_container_ids, sample_all, select_filesystem, DockerCounter, EndpointProber,
        FilesystemEntry, HostSampler, MetricSampler,
    };
    use crate::sampler::system::load_snapshot;
    use async_trait::async_trait;
    use std::path::Path;
    use std::time::{Duration, Instant};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use url::Url;

    fn fs(mount: &str, total: u64, available: u64) -> FilesystemEntry {
        FilesystemEntry {
            mount_point: mount.to_string(),
            total_bytes: total,
            available_bytes: available,
        }
    }

    /// Serve exactly one HTTP response with the given status line
    async fn serve_once(status_line: &'static str) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let mut received = Vec::new();
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                received.extend_from_slice(&buf[..n]);
                if received.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok",
                status_line
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        Url::parse(&format!("http://{}/health", addr)).unwrap()
    }

    #[test]
    fn test_count_container_ids() {
        assert_eq!(count_container_ids(""), 0);
        assert_eq!(count_container_ids("\n"), 0);
        assert_eq!(count_container_ids("a1b2c3\n"), 1);
        assert_eq!(count_container_ids("a1b2c3\nd4e5f6\n\n"), 2);
    }

    #[test]
    fn test_select_filesystem_prefers_longest_mount() {
        let entries = vec![
            fs("/", 1000, 500),
            fs("/var", 2000, 100),
            fs("/var/lib/docker", 4000, 4000),
        ];

        let usage = select_filesystem(&entries, Path::new("/var/log")).unwrap();
        assert_eq!(usage.mount_point, "/var");
        assert_eq!(usage.total_bytes, 2000);

        let root = select_filesystem(&entries, Path::new("/")).unwrap();
        assert_eq!(root.mount_point, "/");
        assert!((root.percent() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_select_filesystem_matches_whole_components() {
        let entries = vec![fs("/data", 1000, 10)];
        let err = select_filesystem(&entries, Path::new("/data2")).unwrap_err();
        assert!(matches!(err, SampleError::NoFilesystem { .. }));
    }

    #[test]
    fn test_select_filesystem_zero_capacity() {
        let entries = vec![fs("/", 0, 0)];
        let err = select_filesystem(&entries, Path::new("/")).unwrap_err();
        assert!(matches!(err, SampleError::ZeroCapacity { .. }));
    }

    #[test]
    fn test_load_snapshot_rejects_zero_cores() {
        assert!(matches!(load_snapshot(1.0, 0), Err(SampleError::NoCpus)));
        let snapshot = load_snapshot(2.0, 4).unwrap();
        assert!((snapshot.percent() - 50.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_docker_counter_missing_binary() {
        let counter = DockerCounter::new("/nonexistent/bin/docker-not-here");
        let err = counter.count_running().await.unwrap_err();
        assert!(matches!(err, SampleError::Spawn { .. }));
        assert!(err.to_string().contains("ps -q"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_docker_counter_counts_output_lines() {
        // `echo ps -q` prints a single line
        let counter = DockerCounter::new("echo");
        assert_eq!(counter.count_running().await.unwrap(), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_docker_counter_non_zero_exit() {
        let counter = DockerCounter::new("false");
        let err = counter.count_running().await.unwrap_err();
        assert!(matches!(err, SampleError::CommandFailed { .. }));
    }

    #[tokio::test]
    async fn test_probe_success_status() {
        let url = serve_once("200 OK").await;
        let prober = EndpointProber::new(Duration::from_secs(5)).unwrap();

        let probe = prober.probe(&url).await;

        assert!(probe.reachable);
        assert_eq!(probe.status_code, Some(200));
        assert!(probe.latency_seconds.is_some());
        assert!(probe.error.is_none());
    }

    #[tokio::test]
    async fn test_probe_server_error_is_unreachable() {
        let url = serve_once("503 Service Unavailable").await;
        let prober = EndpointProber::new(Duration::from_secs(5)).unwrap();

        let probe = prober.probe(&url).await;

        assert!(!probe.reachable);
        assert_eq!(probe.status_code, Some(503));
    }

    #[tokio::test]
    async fn test_probe_refused_connection_is_unreachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = Url::parse(&format!("http://{}/", addr)).unwrap();
        let prober = EndpointProber::new(Duration::from_secs(2)).unwrap();

        let probe = prober.probe(&url).await;

        assert!(!probe.reachable);
        assert!(probe.status_code.is_none());
        assert!(probe.error.is_some());
    }

    #[tokio::test]
    async fn test_probe_hung_endpoint_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            // Accept and never answer
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let url = Url::parse(&format!("http://{}/", addr)).unwrap();
        let prober = EndpointProber::new(Duration::from_secs(1)).unwrap();

        let start = Instant::now();
        let probe = prober.probe(&url).await;
        let elapsed = start.elapsed();

        assert!(elapsed < Duration::from_secs(5), "probe took {:?}", elapsed);
        assert!(!probe.reachable);
        assert!(probe.status_code.is_none());
        assert!(probe.error.unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn test_prober_setup_failure_is_per_metric() {
        let sampler = HostSampler::with_prober(
            "/",
            Err(SampleError::ProbeSetup("no TLS backend".to_string())),
            "false",
        );
        let url = Url::parse("http://localhost:3000").unwrap();

        let err = sampler.probe_endpoint(&url).await.unwrap_err();
        assert!(matches!(&err, SampleError::ProbeSetup(reason) if reason == "no TLS backend"));

        let readings = sample_all(&sampler, &url).await;
        let kinds: Vec<MetricKind> = readings.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, MetricKind::ALL.to_vec());
        assert!(matches!(
            readings[2].result,
            Err(SampleError::ProbeSetup(_))
        ));
    }

    struct FlakySampler;

    #[async_trait]
    impl MetricSampler for FlakySampler {
        async fn sample_disk_usage(&self) -> Result<DiskUsage, SampleError> {
            Err(SampleError::NoFilesystem {
                path: "/".to_string(),
            })
        }

        async fn sample_load(&self) -> Result<LoadSnapshot, SampleError> {
            Ok(LoadSnapshot {
                load_average_1m: 0.4,
                cores: 2,
            })
        }

        async fn probe_endpoint(&self, url: &Url) -> Result<EndpointProbe, SampleError> {
            Ok(EndpointProbe {
                url: url.to_string(),
                status_code: Some(200),
                reachable: true,
                latency_seconds: Some(0.01),
                error: None,
            })
        }

        async fn sample_container_count(&self) -> Result<u64, SampleError> {
            Err(SampleError::CommandFailed {
                command: "docker ps -q".to_string(),
                status: "exit status: 1".to_string(),
                stderr: "Cannot connect to the Docker daemon".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_sample_all_continues_past_failures() {
        let url = Url::parse("http://localhost:3000").unwrap();
        let readings = sample_all(&FlakySampler, &url).await;

        let kinds: Vec<MetricKind> = readings.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, MetricKind::ALL.to_vec());

        assert!(readings[0].result.is_err());
        assert!(readings[1].result.is_ok());
        assert!(readings[2].result.is_ok());
        assert!(readings[3].result.is_err());
    }
}
