//! Command-Line Interface (CLI) argument parsing.
//!
//! This module defines the command-line arguments for the test-message sender
//! using the `clap` crate. The Slack options given here are layered on top of
//! the configuration file and environment variables.

use clap::Parser;
use figment::{
    value::{Dict, Map, Value},
    Error, Metadata, Profile, Provider,
};
use log::LevelFilter;
use std::path::PathBuf;

/// Sends one test message per log level to a Slack incoming webhook.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Slack incoming webhook URL.
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Channel to post to, e.g. `#alerts`.
    #[arg(long)]
    pub channel: Option<String>,

    /// Name to post as.
    #[arg(long)]
    pub username: Option<String>,

    /// Send plain text titles instead of Slack markdown.
    #[arg(long)]
    pub no_markdown: bool,

    /// Lowest level that is forwarded.
    #[arg(long, default_value = "trace")]
    pub level: LevelFilter,

    /// Logger name shown in the messages.
    #[arg(long, default_value = "myLogger")]
    pub logger: String,

    /// Text sent at every level.
    #[arg(short, long, default_value = "test-message")]
    pub message: String,
}

impl Provider for Cli {
    fn metadata(&self) -> Metadata {
        Metadata::named("Command-Line Arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut dict = Dict::new();

        if let Some(endpoint) = &self.endpoint {
            dict.insert("endpoint".into(), Value::from(endpoint.clone()));
        }

        if let Some(channel) = &self.channel {
            dict.insert("channel".into(), Value::from(channel.clone()));
        }

        if let Some(username) = &self.username {
            dict.insert("username".into(), Value::from(username.clone()));
        }

        // Only an explicit flag overrides the file.
        if self.no_markdown {
            dict.insert("allow_markdown".into(), Value::from(false));
        }

        let mut map = Map::new();
        map.insert(Profile::Default, dict);
        Ok(map)
    }
}
