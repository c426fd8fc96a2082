// src/formatting.rs

use crate::config::SlackConfig;
use crate::core::{Level, LogEvent};
use crate::notification::payload::{Attachment, Icon, Message};
use chrono::{Local, NaiveDateTime};

pub const COLOR_DEBUG: &str = "#BDBDBD";
pub const COLOR_INFO: &str = "#64B5F6";
pub const COLOR_WARN: &str = "#FFA726";
pub const COLOR_ERROR: &str = "#EF6C00";
pub const COLOR_FATAL: &str = "#D84315";
/// Slack's built-in green, used for labels that name no level.
pub const COLOR_DEFAULT: &str = "good";

/// Shown next to the attachment's author line.
pub const AUTHOR_ICON: &str = ":ghost:";

const FOOTER_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The attachment color bar for a level.
pub const fn color_for(level: Level) -> &'static str {
    match level {
        Level::Trace | Level::Debug => COLOR_DEBUG,
        Level::Info => COLOR_INFO,
        Level::Warn => COLOR_WARN,
        Level::Error => COLOR_ERROR,
        Level::Fatal => COLOR_FATAL,
    }
}

/// Like [`color_for`], for a free-form label such as a level read from a
/// config file. Only an exact (case-insensitive) level name matches.
pub fn color_for_label(label: &str) -> &'static str {
    label
        .parse::<Level>()
        .map_or(COLOR_DEFAULT, color_for)
}

/// The per-level emoji used when `icon_by_level` is on.
pub const fn icon_for(level: Level) -> &'static str {
    match level {
        Level::Trace => ":squirrel:",
        Level::Debug | Level::Info => ":suspect:",
        Level::Warn => ":feelsgood:",
        Level::Error => ":goberserk:",
        Level::Fatal => ":rage:",
    }
}

/// Cuts `text` down to at most `max_chars` characters, never inside a UTF-8 sequence.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Both renditions of one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedEvent {
    /// The plain-text log line, newline-terminated.
    pub text: String,
    /// The webhook payload.
    pub message: Message,
}

/// Turns log events into Slack messages according to a [`SlackConfig`].
#[derive(Debug, Clone)]
pub struct SlackFormatter {
    config: SlackConfig,
}

impl SlackFormatter {
    pub fn new(config: SlackConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SlackConfig {
        &self.config
    }

    /// Formats an event, stamping the footer with the current local time.
    pub fn format(&self, event: &LogEvent) -> FormattedEvent {
        self.format_at(event, Local::now().naive_local())
    }

    pub fn format_at(&self, event: &LogEvent, now: NaiveDateTime) -> FormattedEvent {
        FormattedEvent {
            text: self.format_text(event),
            message: self.build_message(event, now),
        }
    }

    /// The plain-text line: `Logger (<name>) <message>\n`, prefix optional.
    pub fn format_text(&self, event: &LogEvent) -> String {
        let mut line = String::with_capacity(event.message.len() + event.logger.len() + 12);
        if self.config.add_logger_name_to_message() {
            line.push_str("Logger (");
            line.push_str(&event.logger);
            line.push_str(") ");
        }
        line.push_str(&event.message);
        line.push('\n');
        line
    }

    /// The icon for a level: per-level emoji, or the configured static icon.
    pub fn icon(&self, level: Level) -> &str {
        if self.config.icon_by_level() {
            icon_for(level)
        } else {
            self.config.icon()
        }
    }

    /// The message title, with the message cut to `max_message_length` characters.
    pub fn title(&self, event: &LogEvent) -> String {
        let message = truncate_chars(&event.message, self.config.max_message_length());
        if self.config.allow_markdown() {
            format!(
                "*{}* _( Logger: *{}* )_: {}",
                event.level, event.logger, message
            )
        } else {
            format!("{} ( Logger: {} ): {}", event.level, event.logger, message)
        }
    }

    fn build_message(&self, event: &LogEvent, now: NaiveDateTime) -> Message {
        let attachment = self
            .config
            .as_attachment()
            .then(|| self.build_attachment(event, now));

        Message {
            username: self.config.username().to_string(),
            icon: Icon::parse(self.icon(event.level)),
            channel: self.config.channel().to_string(),
            text: self.title(event),
            mrkdwn: self.config.allow_markdown(),
            link_names: self.config.link_names(),
            unfurl_links: self.config.unfurl_links(),
            unfurl_media: self.config.unfurl_media(),
            attachment,
        }
    }

    fn build_attachment(&self, event: &LogEvent, now: NaiveDateTime) -> Attachment {
        let mrkdwn_in = if self.config.allow_markdown() {
            self.config.markdown_in_attachments().to_vec()
        } else {
            Vec::new()
        };

        Attachment {
            author_name: format!("Full {} Message", event.level.capitalized()),
            author_icon: AUTHOR_ICON.to_string(),
            color: color_for(event.level).to_string(),
            text: event.message.clone(),
            mrkdwn_in,
            footer: format!(
                "Logger: *{}* | Date: *{}*",
                event.logger,
                now.format(FOOTER_DATE_FORMAT)
            ),
            fields: Vec::new(),
        }
    }
}
