//! A client for sending notifications to Slack.

use crate::notification::payload::Message;
use crate::notification::DeliveryError;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Something that can POST a JSON body to a webhook URL.
pub trait WebhookTransport: Send + Sync {
    fn post(&self, url: &str, payload: &Value) -> Result<(), DeliveryError>;
}

/// The production transport, a blocking `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new() -> Result<Self, DeliveryError> {
        Self::with_timeout(Self::DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, DeliveryError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(DeliveryError::Client)?;
        Ok(Self { client })
    }
}

impl WebhookTransport for HttpTransport {
    fn post(&self, url: &str, payload: &Value) -> Result<(), DeliveryError> {
        let response = self.client.post(url).json(payload).send();

        match response {
            Ok(res) => {
                if res.status().is_success() {
                    debug!("Successfully posted message to Slack.");
                    Ok(())
                } else {
                    let status = res.status();
                    let body = res.text().unwrap_or_default();
                    debug!(
                        status = %status,
                        body = %body,
                        "Slack rejected the notification"
                    );
                    Err(DeliveryError::Status { status, body })
                }
            }
            Err(e) => {
                debug!(error = %e, "HTTP request to Slack failed");
                Err(DeliveryError::Http(e))
            }
        }
    }
}

/// Sends messages to a single Slack webhook.
pub struct SlackClient<T = HttpTransport> {
    webhook_url: String,
    transport: T,
}

impl<T: WebhookTransport> SlackClient<T> {
    pub fn new(webhook_url: impl Into<String>, transport: T) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            transport,
        }
    }

    pub fn webhook_url(&self) -> &str {
        &self.webhook_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Posts one message.
    ///
    /// Transport failures are swallowed into `Ok(false)`: a failed
    /// notification must not raise an error that would itself get logged and
    /// sent again. Every other failure is returned to the caller.
    #[instrument(skip_all, fields(channel = %message.channel))]
    pub fn send(&self, message: &Message) -> Result<bool, DeliveryError> {
        if self.webhook_url.is_empty() {
            return Err(DeliveryError::MissingEndpoint);
        }

        let payload = serde_json::to_value(message)?;
        match self.transport.post(&self.webhook_url, &payload) {
            Ok(()) => Ok(true),
            Err(e) if e.is_transport() => {
                warn!(error = %e, "Dropping Slack notification after transport failure");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}
