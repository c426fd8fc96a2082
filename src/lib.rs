//! slack-appender - forward log events to a Slack incoming webhook
//!
//! This library provides a `log` backend that formats each record as a Slack
//! message (title, colored attachment, footer) and posts it to a webhook.
pub mod notification;

pub mod appender;
pub mod cli;
pub mod config;
pub mod core;
pub mod formatting;

// Re-export core types for convenience
pub use crate::core::*;
pub use appender::SlackAppender;
