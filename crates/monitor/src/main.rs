//! Host Monitor - host health checks with email alerting
//!
//! Meant to be invoked periodically by an external scheduler (cron). Each
//! invocation runs one pass: sample, classify, decide, notify, exit.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use monitor_lib::config::{load_env_file, log_file_from_env};
use monitor_lib::observability::{init_logging, LogOptions};
use tracing::{error, info, warn};

/// Host health monitor
#[derive(Parser)]
#[command(name = "host-monitor")]
#[command(author, version, about = "Host health monitor with email alerting", long_about = None)]
pub struct Cli {
    /// Dotenv file loaded before reading the environment (skipped if absent)
    #[arg(long, default_value = ".env.monitoring")]
    pub env_file: PathBuf,

    /// Log file path (defaults to MONITORING_LOG_FILE or /tmp/host-monitor.log)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Disable the log file sink
    #[arg(long)]
    pub no_log_file: bool,

    /// Emit console logs as JSON
    #[arg(long)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one monitoring pass (default)
    Check {
        /// Compute the decision but do not send any email
        #[arg(long)]
        dry_run: bool,

        /// Print the pass outcome as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Send a test email to verify SMTP configuration
    TestEmail,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Must happen before logging so MONITORING_LOG_FILE can come from the file
    let env_file = load_env_file(&cli.env_file);

    let log_file = if cli.no_log_file {
        None
    } else {
        Some(cli.log_file.clone().unwrap_or_else(log_file_from_env))
    };
    if let Err(e) = init_logging(&LogOptions {
        file: log_file,
        json: cli.log_json,
    }) {
        eprintln!("failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match env_file {
        Ok(true) => info!(path = %cli.env_file.display(), "Loaded env file"),
        Ok(false) => {}
        Err(e) => {
            error!(error = %e, "Configuration error");
            return ExitCode::FAILURE;
        }
    }

    match cli.command.unwrap_or(Commands::Check {
        dry_run: false,
        json: false,
    }) {
        Commands::Check { dry_run, json } => match commands::check::run(dry_run, json).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!(error = format!("{e:#}"), "Monitoring pass failed");
                ExitCode::FAILURE
            }
        },
        Commands::TestEmail => match commands::test_email::run().await {
            Ok(()) => {
                info!("Email configuration verified");
                ExitCode::SUCCESS
            }
            Err(e) => {
                warn!(error = format!("{e:#}"), "Email configuration test failed");
                ExitCode::from(1)
            }
        },
    }
}
