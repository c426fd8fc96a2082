//! slack-appender - send test messages through the Slack log appender
//!
//! Loads the appender configuration, posts a FATAL event directly, then
//! installs the appender as the `log` backend and logs one message per level.

use anyhow::{bail, Result};
use clap::Parser;
use slack_appender::{
    cli::Cli,
    config::{SlackConfig, ENV_PREFIX},
    Level, LogEvent, Notifier, SlackAppender,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Diagnostics go through tracing; the `log` facade belongs to the appender.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Layer configuration sources: defaults, file, environment, CLI args.
    let figment = SlackConfig::figment(cli.config.as_deref()).merge(cli.clone());
    let config = SlackConfig::from_figment(&figment)?;
    if config.endpoint().is_empty() {
        bail!(
            "no webhook endpoint configured: pass --endpoint or set {}ENDPOINT",
            ENV_PREFIX
        );
    }

    info!("-------------------- Configuration --------------------");
    info!("Channel: {}", config.channel());
    info!("Username: {}", config.username());
    info!("Markdown: {}", config.allow_markdown());
    info!("Attachment: {}", config.as_attachment());
    info!("Level: {}", cli.level);
    info!("-------------------------------------------------------");

    let appender = SlackAppender::new(config)?.with_level(cli.level);

    // `log` has no FATAL, so that one goes through the notifier.
    let fatal = LogEvent::new(Level::Fatal, "root", format!("{}-fatal", cli.message));
    if appender.notify(&fatal)? {
        info!("Sent FATAL test message.");
    } else {
        warn!("FATAL test message was not delivered.");
    }

    appender.init()?;

    let target = cli.logger.as_str();
    let message = cli.message.as_str();
    log::trace!(target: target, "{}-trace", message);
    log::debug!(target: target, "{}-debug", message);
    log::info!(target: target, "{}-info", message);
    log::warn!(target: target, "{}-warn @channel *WATTT*", message);
    log::error!(target: target, "{}-error", message);

    info!("Done.");
    Ok(())
}
