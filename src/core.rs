//! Core domain types and service traits for the Slack appender
//!
//! This module defines the log event consumed by the formatter and the
//! capability trait every notification backend implements.

use crate::notification::DeliveryError;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The severity of a log event, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    /// Not produced by the `log` facade; only reachable through [`LogEvent::new`].
    Fatal,
}

impl Level {
    /// The canonical upper-case name, as shown in message titles.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Fatal => "FATAL",
        }
    }

    /// The name with only its first letter upper-case, e.g. `Error`.
    pub const fn capitalized(self) -> &'static str {
        match self {
            Self::Trace => "Trace",
            Self::Debug => "Debug",
            Self::Info => "Info",
            Self::Warn => "Warn",
            Self::Error => "Error",
            Self::Fatal => "Fatal",
        }
    }

    pub const fn all() -> [Self; 6] {
        [
            Self::Trace,
            Self::Debug,
            Self::Info,
            Self::Warn,
            Self::Error,
            Self::Fatal,
        ]
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a label names none of the six levels.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown log level: '{0}'")]
pub struct ParseLevelError(pub String);

impl FromStr for Level {
    type Err = ParseLevelError;

    /// Exact, case-insensitive match against the six level names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseLevelError(s.to_string()))
    }
}

impl From<log::Level> for Level {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Trace => Self::Trace,
            log::Level::Debug => Self::Debug,
            log::Level::Info => Self::Info,
            log::Level::Warn => Self::Warn,
            log::Level::Error => Self::Error,
        }
    }
}

/// A single log event as seen by the appender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    /// Severity of the event
    pub level: Level,
    /// Name of the logger that produced the event (the `log` target)
    pub logger: String,
    /// The rendered message text
    pub message: String,
}

impl LogEvent {
    pub fn new(level: Level, logger: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            logger: logger.into(),
            message: message.into(),
        }
    }
}

impl From<&log::Record<'_>> for LogEvent {
    fn from(record: &log::Record<'_>) -> Self {
        Self {
            level: record.level().into(),
            logger: record.target().to_string(),
            message: record.args().to_string(),
        }
    }
}

/// A destination that log events can be forwarded to.
pub trait Notifier: Send + Sync {
    /// Formats and delivers a single event.
    ///
    /// Returns `Ok(false)` when delivery failed at the transport level, and
    /// `Err` for any failure that is not the network's fault.
    fn notify(&self, event: &LogEvent) -> Result<bool, DeliveryError>;
}
