//! Delivery of formatted log events to Slack.
//!
//! `payload` holds the JSON shape of an incoming-webhook message, and `slack`
//! the client that posts it. Failures are classified so the appender can tell
//! a flaky network apart from a programming error.
pub mod payload;
pub mod slack;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("HTTP request to Slack failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("Slack responded with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("no webhook endpoint configured")]
    MissingEndpoint,

    #[error("failed to encode Slack payload: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl DeliveryError {
    /// True for failures caused by the network or the remote service.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Status { .. })
    }
}
