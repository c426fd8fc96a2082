//! The JSON body of a Slack incoming-webhook message.

use crate::config::MarkdownField;
use serde::{Serialize, Serializer};

/// Either a Slack emoji code (`:ghost:`) or the URL of an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Icon {
    #[serde(rename = "icon_emoji")]
    Emoji(String),
    #[serde(rename = "icon_url")]
    Url(String),
}

impl Icon {
    /// Returns `None` for an empty string, which leaves the webhook's own icon in place.
    pub fn parse(icon: &str) -> Option<Self> {
        if icon.is_empty() {
            None
        } else if icon.len() > 1 && icon.starts_with(':') && icon.ends_with(':') {
            Some(Self::Emoji(icon.to_string()))
        } else {
            Some(Self::Url(icon.to_string()))
        }
    }
}

/// A single message posted to the webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub username: String,
    #[serde(flatten)]
    pub icon: Option<Icon>,
    pub channel: String,
    /// The title line shown above the attachment.
    pub text: String,
    pub mrkdwn: bool,
    pub link_names: bool,
    pub unfurl_links: bool,
    pub unfurl_media: bool,
    #[serde(
        rename = "attachments",
        serialize_with = "serialize_attachment",
        skip_serializing_if = "Option::is_none"
    )]
    pub attachment: Option<Attachment>,
}

fn serialize_attachment<S: Serializer>(
    attachment: &Option<Attachment>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    attachment.as_slice().serialize(serializer)
}

/// The colored block carrying the full message.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Attachment {
    pub author_name: String,
    pub author_icon: String,
    pub color: String,
    pub text: String,
    pub mrkdwn_in: Vec<MarkdownField>,
    pub footer: String,
    pub fields: Vec<AttachmentField>,
}

impl Attachment {
    pub fn add_field(&mut self, field: AttachmentField) -> &mut Self {
        self.fields.push(field);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentField {
    pub title: String,
    pub value: String,
    /// Rendered side by side with other short fields.
    pub short: bool,
}

impl AttachmentField {
    pub fn new(title: impl Into<String>, value: impl Into<String>, short: bool) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
            short,
        }
    }
}
