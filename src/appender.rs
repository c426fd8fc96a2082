//! The `log` backend that forwards records to Slack.
//!
//! `SlackAppender` pairs a [`SlackFormatter`] with a [`SlackClient`]. It can be
//! driven directly through [`Notifier`] or installed as the global logger.
//! Records coming from the HTTP stack, from this crate, or emitted while a
//! delivery is already running on the same thread are ignored, so a failing
//! delivery can never feed itself.

use crate::config::SlackConfig;
use crate::core::{LogEvent, Notifier};
use crate::formatting::SlackFormatter;
use crate::notification::slack::{HttpTransport, SlackClient, WebhookTransport};
use crate::notification::DeliveryError;
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::cell::Cell;
use tracing::{debug, error};

/// Targets whose records never reach Slack.
const INTERNAL_TARGETS: &[&str] = &[
    "slack_appender",
    "reqwest",
    "hyper",
    "hyper_util",
    "h2",
    "http",
    "rustls",
    "tokio_rustls",
    "native_tls",
    "want",
    "mio",
    "tokio",
    "tower",
];

fn is_internal_target(target: &str) -> bool {
    INTERNAL_TARGETS.iter().any(|internal| {
        target
            .strip_prefix(internal)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
    })
}

thread_local! {
    static DELIVERING: Cell<bool> = const { Cell::new(false) };
}

/// Marks the current thread as busy delivering; `None` if it already is.
struct DeliveryGuard;

impl DeliveryGuard {
    fn enter() -> Option<Self> {
        DELIVERING.with(|flag| if flag.replace(true) { None } else { Some(Self) })
    }
}

impl Drop for DeliveryGuard {
    fn drop(&mut self) {
        DELIVERING.with(|flag| flag.set(false));
    }
}

pub struct SlackAppender<T = HttpTransport> {
    formatter: SlackFormatter,
    client: SlackClient<T>,
    level: LevelFilter,
}

impl SlackAppender<HttpTransport> {
    /// Creates an appender posting over HTTP to the configured endpoint.
    pub fn new(config: SlackConfig) -> Result<Self, DeliveryError> {
        Ok(Self::with_transport(config, HttpTransport::new()?))
    }
}

impl<T: WebhookTransport> SlackAppender<T> {
    pub fn with_transport(config: SlackConfig, transport: T) -> Self {
        let client = SlackClient::new(config.endpoint(), transport);
        Self {
            formatter: SlackFormatter::new(config),
            client,
            level: LevelFilter::Trace,
        }
    }

    /// Only records at or above `level` are forwarded.
    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }

    pub fn formatter(&self) -> &SlackFormatter {
        &self.formatter
    }

    pub fn client(&self) -> &SlackClient<T> {
        &self.client
    }
}

impl<T: WebhookTransport + 'static> SlackAppender<T> {
    /// Installs the appender as the global `log` backend.
    ///
    /// The global max level is only changed once the install succeeded.
    pub fn init(self) -> Result<(), SetLoggerError> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(level);
        Ok(())
    }
}

impl<T: WebhookTransport> Notifier for SlackAppender<T> {
    fn notify(&self, event: &LogEvent) -> Result<bool, DeliveryError> {
        let formatted = self.formatter.format(event);
        debug!(line = formatted.text.trim_end(), "Forwarding log event to Slack");
        self.client.send(&formatted.message)
    }
}

impl<T: WebhookTransport> Log for SlackAppender<T> {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level && !is_internal_target(metadata.target())
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let Some(_guard) = DeliveryGuard::enter() else {
            return;
        };

        if let Err(e) = self.notify(&LogEvent::from(record)) {
            error!(error = %e, logger = record.target(), "Failed to deliver log event to Slack");
        }
    }

    fn flush(&self) {}
}
