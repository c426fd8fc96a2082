//! Configuration management for the Slack appender
//!
//! This module defines the `SlackConfig` struct, which holds every option the
//! formatter and the delivery client read. Options can be changed through
//! typed setters, through keyed access (`get`/`set` with the option name), or
//! loaded with the `figment` crate from a TOML file merged with environment
//! variables. All three paths apply the same validation.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Every endpoint must start with this prefix.
pub const ENDPOINT_PREFIX: &str = "https://hooks.slack.com";

/// Prefix of the environment variables read by [`SlackConfig::load`].
pub const ENV_PREFIX: &str = "SLACK_APPENDER_";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid setting key: ({0})")]
    UnknownKey(String),

    #[error("invalid endpoint '{0}': must start with {prefix}", prefix = ENDPOINT_PREFIX)]
    InvalidEndpoint(String),

    #[error("username invalid")]
    InvalidUsername,

    #[error("channel invalid")]
    InvalidChannel,

    #[error("icon invalid")]
    InvalidIcon,

    #[error("invalid value for setting '{key}': expected {expected}")]
    InvalidValue {
        key: &'static str,
        expected: &'static str,
    },

    #[error("unknown markdown field: '{0}'")]
    InvalidMarkdownField(String),

    #[error("failed to load configuration: {0}")]
    Load(#[from] figment::Error),
}

/// Attachment fields Slack may render as markdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkdownField {
    Pretext,
    Text,
    Title,
    Fields,
    Fallback,
}

impl MarkdownField {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pretext => "pretext",
            Self::Text => "text",
            Self::Title => "title",
            Self::Fields => "fields",
            Self::Fallback => "fallback",
        }
    }
}

impl FromStr for MarkdownField {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pretext" => Ok(Self::Pretext),
            "text" => Ok(Self::Text),
            "title" => Ok(Self::Title),
            "fields" => Ok(Self::Fields),
            "fallback" => Ok(Self::Fallback),
            _ => Err(ConfigError::InvalidMarkdownField(s.to_string())),
        }
    }
}

/// The names of all recognized options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    Endpoint,
    Channel,
    Username,
    Icon,
    LinkNames,
    UnfurlLinks,
    UnfurlMedia,
    AllowMarkdown,
    AsAttachment,
    MarkdownInAttachments,
    MaxMessageLength,
    IconByLevel,
    AddLoggerNameToMessage,
}

impl ConfigKey {
    pub const ALL: [Self; 13] = [
        Self::Endpoint,
        Self::Channel,
        Self::Username,
        Self::Icon,
        Self::LinkNames,
        Self::UnfurlLinks,
        Self::UnfurlMedia,
        Self::AllowMarkdown,
        Self::AsAttachment,
        Self::MarkdownInAttachments,
        Self::MaxMessageLength,
        Self::IconByLevel,
        Self::AddLoggerNameToMessage,
    ];

    /// The key as it appears in config files and keyed access.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Endpoint => "endpoint",
            Self::Channel => "channel",
            Self::Username => "username",
            Self::Icon => "icon",
            Self::LinkNames => "link_names",
            Self::UnfurlLinks => "unfurl_links",
            Self::UnfurlMedia => "unfurl_media",
            Self::AllowMarkdown => "allow_markdown",
            Self::AsAttachment => "as_attachment",
            Self::MarkdownInAttachments => "markdown_in_attachments",
            Self::MaxMessageLength => "max_message_length",
            Self::IconByLevel => "icon_by_level",
            Self::AddLoggerNameToMessage => "add_logger_name_to_message",
        }
    }

    const fn expected_type(self) -> &'static str {
        match self {
            Self::Endpoint | Self::Channel | Self::Username | Self::Icon => "a string",
            Self::MarkdownInAttachments => "a list of strings",
            Self::MaxMessageLength => "an unsigned integer",
            _ => "a boolean",
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

/// A dynamically typed option value used by keyed access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    Bool(bool),
    Int(u64),
    Str(String),
    List(Vec<String>),
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<u64> for ConfigValue {
    fn from(value: u64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Vec<&str>> for ConfigValue {
    fn from(value: Vec<&str>) -> Self {
        Self::List(value.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for ConfigValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// Settings for formatting and delivering log events to a Slack webhook.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SlackConfig {
    /// The incoming webhook URL, empty until configured.
    #[serde(deserialize_with = "deserialize_scalar_string")]
    endpoint: String,
    /// Channel (`#general`), private group or `@user` to post to.
    #[serde(deserialize_with = "deserialize_scalar_string")]
    channel: String,
    #[serde(deserialize_with = "deserialize_scalar_string")]
    username: String,
    /// Emoji code like `:ghost:` or an image URL. Empty leaves the webhook default.
    #[serde(deserialize_with = "deserialize_scalar_string")]
    icon: String,
    /// Turn `@names` into links.
    link_names: bool,
    unfurl_links: bool,
    unfurl_media: bool,
    /// Whether the message text is rendered as Slack markdown.
    allow_markdown: bool,
    /// Send the full message as an attachment below the title.
    as_attachment: bool,
    markdown_in_attachments: Vec<MarkdownField>,
    /// Maximum number of characters of the message shown in the title.
    max_message_length: usize,
    icon_by_level: bool,
    add_logger_name_to_message: bool,
}

/// Reads a string option, keeping numbers and booleans as their text.
///
/// `figment::providers::Env` parses `SLACK_APPENDER_USERNAME=42` into an
/// integer, which a plain `String` field would reject.
fn deserialize_scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{Error, Visitor};

    struct ScalarStringVisitor;

    impl Visitor<'_> for ScalarStringVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string, number or boolean")
        }

        fn visit_str<E: Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(v.to_string())
        }

        fn visit_string<E: Error>(self, v: String) -> Result<Self::Value, E> {
            Ok(v)
        }

        fn visit_bool<E: Error>(self, v: bool) -> Result<Self::Value, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E: Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(v.to_string())
        }
    }

    deserializer.deserialize_any(ScalarStringVisitor)
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            channel: "#general".to_string(),
            username: "Robot".to_string(),
            icon: String::new(),
            link_names: false,
            unfurl_links: false,
            unfurl_media: true,
            allow_markdown: true,
            as_attachment: true,
            markdown_in_attachments: Vec::new(),
            max_message_length: 170,
            icon_by_level: true,
            add_logger_name_to_message: true,
        }
    }
}

impl SlackConfig {
    /// Builds a configuration from a partial set of options merged over the defaults.
    pub fn from_overrides<I, K, V>(overrides: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<ConfigValue>,
    {
        let mut config = Self::default();
        for (key, value) in overrides {
            config.set(key.as_ref(), value)?;
        }
        Ok(config)
    }

    /// Builds the layered figment: defaults, then the optional TOML file,
    /// then `SLACK_APPENDER_*` environment variables.
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(SlackConfig::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Loads the configuration from an optional TOML file and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::from_figment(&Self::figment(path))
    }

    /// Extracts and validates a configuration from any figment.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: SlackConfig = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants a deserialized configuration may have skipped.
    ///
    /// An empty endpoint and an empty icon are accepted here because both are
    /// the defaults.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.endpoint.is_empty() {
            check_endpoint(&self.endpoint)?;
        }
        if self.username.is_empty() {
            return Err(ConfigError::InvalidUsername);
        }
        if self.channel.is_empty() {
            return Err(ConfigError::InvalidChannel);
        }
        Ok(())
    }

    /// Reads an option by name.
    pub fn get(&self, key: &str) -> Result<ConfigValue, ConfigError> {
        let value = match key.parse::<ConfigKey>()? {
            ConfigKey::Endpoint => ConfigValue::Str(self.endpoint.clone()),
            ConfigKey::Channel => ConfigValue::Str(self.channel.clone()),
            ConfigKey::Username => ConfigValue::Str(self.username.clone()),
            ConfigKey::Icon => ConfigValue::Str(self.icon.clone()),
            ConfigKey::LinkNames => ConfigValue::Bool(self.link_names),
            ConfigKey::UnfurlLinks => ConfigValue::Bool(self.unfurl_links),
            ConfigKey::UnfurlMedia => ConfigValue::Bool(self.unfurl_media),
            ConfigKey::AllowMarkdown => ConfigValue::Bool(self.allow_markdown),
            ConfigKey::AsAttachment => ConfigValue::Bool(self.as_attachment),
            ConfigKey::MarkdownInAttachments => ConfigValue::List(
                self.markdown_in_attachments
                    .iter()
                    .map(|field| field.as_str().to_string())
                    .collect(),
            ),
            ConfigKey::MaxMessageLength => ConfigValue::Int(self.max_message_length as u64),
            ConfigKey::IconByLevel => ConfigValue::Bool(self.icon_by_level),
            ConfigKey::AddLoggerNameToMessage => ConfigValue::Bool(self.add_logger_name_to_message),
        };
        Ok(value)
    }

    /// Writes an option by name, applying the same validation as the typed setters.
    pub fn set(&mut self, key: &str, value: impl Into<ConfigValue>) -> Result<(), ConfigError> {
        let key = key.parse::<ConfigKey>()?;
        match (key, value.into()) {
            (ConfigKey::Endpoint, ConfigValue::Str(s)) => self.set_endpoint(s)?,
            (ConfigKey::Channel, ConfigValue::Str(s)) => self.set_channel(s)?,
            (ConfigKey::Username, ConfigValue::Str(s)) => self.set_username(s)?,
            (ConfigKey::Icon, ConfigValue::Str(s)) => self.set_icon(s)?,
            (ConfigKey::LinkNames, ConfigValue::Bool(b)) => self.link_names = b,
            (ConfigKey::UnfurlLinks, ConfigValue::Bool(b)) => self.unfurl_links = b,
            (ConfigKey::UnfurlMedia, ConfigValue::Bool(b)) => self.unfurl_media = b,
            (ConfigKey::AllowMarkdown, ConfigValue::Bool(b)) => self.allow_markdown = b,
            (ConfigKey::AsAttachment, ConfigValue::Bool(b)) => self.as_attachment = b,
            (ConfigKey::IconByLevel, ConfigValue::Bool(b)) => self.icon_by_level = b,
            (ConfigKey::AddLoggerNameToMessage, ConfigValue::Bool(b)) => {
                self.add_logger_name_to_message = b
            }
            (ConfigKey::MaxMessageLength, ConfigValue::Int(n)) => {
                self.max_message_length = usize::try_from(n).map_err(|_| {
                    ConfigError::InvalidValue {
                        key: key.as_str(),
                        expected: key.expected_type(),
                    }
                })?;
            }
            (ConfigKey::MarkdownInAttachments, ConfigValue::List(items)) => {
                let fields = items
                    .iter()
                    .map(|item| item.parse::<MarkdownField>())
                    .collect::<Result<Vec<_>, _>>()?;
                self.set_markdown_in_attachments(fields);
            }
            (key, _) => {
                return Err(ConfigError::InvalidValue {
                    key: key.as_str(),
                    expected: key.expected_type(),
                })
            }
        }
        Ok(())
    }

    pub fn set_endpoint(&mut self, endpoint: impl Into<String>) -> Result<(), ConfigError> {
        let endpoint = endpoint.into();
        check_endpoint(&endpoint)?;
        self.endpoint = endpoint;
        Ok(())
    }

    pub fn set_channel(&mut self, channel: impl Into<String>) -> Result<(), ConfigError> {
        let channel = channel.into();
        if channel.is_empty() {
            return Err(ConfigError::InvalidChannel);
        }
        self.channel = channel;
        Ok(())
    }

    pub fn set_username(&mut self, username: impl Into<String>) -> Result<(), ConfigError> {
        let username = username.into();
        if username.is_empty() {
            return Err(ConfigError::InvalidUsername);
        }
        self.username = username;
        Ok(())
    }

    pub fn set_icon(&mut self, icon: impl Into<String>) -> Result<(), ConfigError> {
        let icon = icon.into();
        if icon.is_empty() {
            return Err(ConfigError::InvalidIcon);
        }
        self.icon = icon;
        Ok(())
    }

    pub fn set_link_names(&mut self, link_names: bool) {
        self.link_names = link_names;
    }

    pub fn set_unfurl_links(&mut self, unfurl_links: bool) {
        self.unfurl_links = unfurl_links;
    }

    pub fn set_unfurl_media(&mut self, unfurl_media: bool) {
        self.unfurl_media = unfurl_media;
    }

    pub fn set_allow_markdown(&mut self, allow_markdown: bool) {
        self.allow_markdown = allow_markdown;
    }

    pub fn set_as_attachment(&mut self, as_attachment: bool) {
        self.as_attachment = as_attachment;
    }

    /// Duplicates are dropped, first occurrence wins.
    pub fn set_markdown_in_attachments(&mut self, fields: impl IntoIterator<Item = MarkdownField>) {
        self.markdown_in_attachments.clear();
        for field in fields {
            if !self.markdown_in_attachments.contains(&field) {
                self.markdown_in_attachments.push(field);
            }
        }
    }

    pub fn set_max_message_length(&mut self, max_message_length: usize) {
        self.max_message_length = max_message_length;
    }

    pub fn set_icon_by_level(&mut self, icon_by_level: bool) {
        self.icon_by_level = icon_by_level;
    }

    pub fn set_add_logger_name_to_message(&mut self, add_logger_name: bool) {
        self.add_logger_name_to_message = add_logger_name;
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn icon(&self) -> &str {
        &self.icon
    }

    pub fn link_names(&self) -> bool {
        self.link_names
    }

    pub fn unfurl_links(&self) -> bool {
        self.unfurl_links
    }

    pub fn unfurl_media(&self) -> bool {
        self.unfurl_media
    }

    pub fn allow_markdown(&self) -> bool {
        self.allow_markdown
    }

    pub fn as_attachment(&self) -> bool {
        self.as_attachment
    }

    pub fn markdown_in_attachments(&self) -> &[MarkdownField] {
        &self.markdown_in_attachments
    }

    pub fn max_message_length(&self) -> usize {
        self.max_message_length
    }

    pub fn icon_by_level(&self) -> bool {
        self.icon_by_level
    }

    pub fn add_logger_name_to_message(&self) -> bool {
        self.add_logger_name_to_message
    }
}

fn check_endpoint(endpoint: &str) -> Result<(), ConfigError> {
    if endpoint.starts_with(ENDPOINT_PREFIX) {
        Ok(())
    } else {
        Err(ConfigError::InvalidEndpoint(endpoint.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENDPOINT: &str = "https://hooks.slack.com/services/T000/B000/XXXX";

    #[test]
    fn test_defaults() {
        let config = SlackConfig::default();
        assert_eq!(config.endpoint(), "");
        assert_eq!(config.channel(), "#general");
        assert_eq!(config.username(), "Robot");
        assert_eq!(config.icon(), "");
        assert!(!config.link_names());
        assert!(!config.unfurl_links());
        assert!(config.unfurl_media());
        assert!(config.allow_markdown());
        assert!(config.as_attachment());
        assert!(config.markdown_in_attachments().is_empty());
        assert_eq!(config.max_message_length(), 170);
        assert!(config.icon_by_level());
        assert!(config.add_logger_name_to_message());
    }

    #[test]
    fn test_every_key_is_readable() {
        let config = SlackConfig::default();
        for key in ConfigKey::ALL {
            assert!(config.get(key.as_str()).is_ok(), "key {} not readable", key);
        }
    }

    #[test]
    fn test_unknown_key_rejected_on_get_and_set() {
        let mut config = SlackConfig::default();
        assert!(matches!(
            config.get("colour"),
            Err(ConfigError::UnknownKey(k)) if k == "colour"
        ));
        assert!(matches!(
            config.set("colour", "red"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_endpoint_validation() {
        let mut config = SlackConfig::default();
        assert!(matches!(
            config.set_endpoint("https://example.com/hook"),
            Err(ConfigError::InvalidEndpoint(_))
        ));
        assert!(matches!(
            config.set("endpoint", "http://hooks.slack.com/services/x"),
            Err(ConfigError::InvalidEndpoint(_))
        ));
        assert_eq!(config.endpoint(), "");

        config.set("endpoint", ENDPOINT).unwrap();
        assert_eq!(config.get("endpoint").unwrap(), ConfigValue::Str(ENDPOINT.to_string()));
    }

    #[test]
    fn test_empty_strings_rejected() {
        let mut config = SlackConfig::default();
        assert!(matches!(config.set_username(""), Err(ConfigError::InvalidUsername)));
        assert!(matches!(config.set_channel(""), Err(ConfigError::InvalidChannel)));
        assert!(matches!(config.set_icon(""), Err(ConfigError::InvalidIcon)));
        assert_eq!(config.username(), "Robot");
        assert_eq!(config.channel(), "#general");
    }

    #[test]
    fn test_wrong_value_type_rejected() {
        let mut config = SlackConfig::default();
        let err = config.set("allow_markdown", "yes").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { key: "allow_markdown", expected: "a boolean" }
        ));
        assert!(config.set("max_message_length", true).is_err());
        assert!(config.allow_markdown());
    }

    #[test]
    fn test_from_overrides_merges_over_defaults() {
        let config = SlackConfig::from_overrides([
            ("username", ConfigValue::from("log-bot")),
            ("allow_markdown", ConfigValue::from(false)),
            ("max_message_length", ConfigValue::from(20u64)),
        ])
        .unwrap();

        assert_eq!(config.username(), "log-bot");
        assert!(!config.allow_markdown());
        assert_eq!(config.max_message_length(), 20);
        assert_eq!(config.channel(), "#general");
    }

    #[test]
    fn test_from_overrides_rejects_bad_endpoint() {
        let result = SlackConfig::from_overrides([("endpoint", "https://evil.example.com")]);
        assert!(matches!(result, Err(ConfigError::InvalidEndpoint(_))));
    }

    #[test]
    fn test_markdown_fields_by_key() {
        let mut config = SlackConfig::default();
        config
            .set("markdown_in_attachments", vec!["text", "title", "text"])
            .unwrap();
        assert_eq!(
            config.markdown_in_attachments(),
            &[MarkdownField::Text, MarkdownField::Title]
        );
        assert!(matches!(
            config.set("markdown_in_attachments", vec!["body"]),
            Err(ConfigError::InvalidMarkdownField(f)) if f == "body"
        ));
    }
}
