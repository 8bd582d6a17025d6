//! SMTP configuration test

use anyhow::{Context, Result};
use chrono::Local;
use monitor_lib::notifier::EmailNotifier;
use monitor_lib::SmtpSettings;
use tracing::info;

/// Send a plain-text test message to every administrator
pub async fn run() -> Result<()> {
    let settings = SmtpSettings::from_env().context("invalid SMTP configuration")?;

    info!(
        server = %settings.server,
        port = settings.port,
        sender = %settings.sender,
        recipients = %settings.recipients.join(", "),
        "Connecting to SMTP server"
    );

    let notifier = EmailNotifier::new(&settings).context("failed to set up email delivery")?;
    let now = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    notifier
        .send_plain(
            &format!("Host monitor test - {}", now),
            &test_body(&settings, &now),
        )
        .await
        .context("failed to send test email")?;

    Ok(())
}

fn test_body(settings: &SmtpSettings, now: &str) -> String {
    format!(
        "Host monitor configuration test\n\
         \n\
         - Date: {}\n\
         - SMTP server: {}:{}\n\
         - Sender: {}\n\
         - Recipients: {}\n\
         \n\
         If you received this email, alert delivery is configured correctly.\n",
        now,
        settings.server,
        settings.port,
        settings.sender,
        settings.recipients.join(", ")
    )
}
