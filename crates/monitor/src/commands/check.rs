//! Monitoring pass command

use anyhow::{Context, Result};
use chrono::{Local, Timelike};
use monitor_lib::alert::{AlertAggregator, HostInfo};
use monitor_lib::notifier::EmailNotifier;
use monitor_lib::sampler::HostSampler;
use monitor_lib::{MonitorConfig, MonitorPass, PassOutcome, StructuredLogger, ThresholdClassifier};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run one pass against the local host
pub async fn run(dry_run: bool, json: bool) -> Result<()> {
    let config = MonitorConfig::from_env().context("invalid configuration")?;

    let host = HostInfo::detect();
    StructuredLogger::new(host.hostname.clone()).log_startup(VERSION, "check");

    let sampler = HostSampler::new(
        config.disk_path.clone(),
        config.probe_timeout,
        config.docker_binary.clone(),
    );
    let classifier = ThresholdClassifier::new(config.thresholds);
    let aggregator = AlertAggregator::new(host);
    let notifier = EmailNotifier::new(&config.smtp).context("failed to set up email delivery")?;

    let hour = Local::now().hour();
    let outcome = MonitorPass::new(
        &sampler,
        &classifier,
        &aggregator,
        &notifier,
        &config.website_url,
    )
    .run(hour, dry_run)
    .await;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else if dry_run {
        print_summary(&outcome);
    }

    Ok(())
}

fn print_summary(outcome: &PassOutcome) {
    let decision = &outcome.decision;
    println!("Highest severity: {}", decision.highest_severity);
    println!("Critical alert:   {}", yes_no(decision.should_send_critical));
    println!("Warning alert:    {}", yes_no(decision.should_send_warning));
    println!("Daily report:     {}", yes_no(decision.should_send_daily_report));
    println!();
    print!("{}", decision.payload);
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "would send"
    } else {
        "no"
    }
}
