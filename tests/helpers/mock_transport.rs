//! A mock webhook transport for testing delivery without a network.

#![allow(dead_code)]

use serde_json::Value;
use slack_appender::notification::slack::WebhookTransport;
use slack_appender::notification::DeliveryError;
use std::sync::{Arc, Mutex};

#[derive(Clone, Debug, Default)]
pub struct MockTransport {
    pub posted: Arc<Mutex<Vec<(String, Value)>>>,
    pub next_failure: Arc<Mutex<Option<DeliveryError>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `post` fail with `error`.
    pub fn fail_next(&self, error: DeliveryError) {
        *self.next_failure.lock().unwrap() = Some(error);
    }

    pub fn get_posted(&self) -> Vec<Value> {
        self.posted
            .lock()
            .unwrap()
            .iter()
            .map(|(_, payload)| payload.clone())
            .collect()
    }

    pub fn get_urls(&self) -> Vec<String> {
        self.posted
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }
}

impl WebhookTransport for MockTransport {
    fn post(&self, url: &str, payload: &Value) -> Result<(), DeliveryError> {
        if let Some(err) = self.next_failure.lock().unwrap().take() {
            return Err(err);
        }
        self.posted
            .lock()
            .unwrap()
            .push((url.to_string(), payload.clone()));
        Ok(())
    }
}
