//! Customer support notifiers.
//!
//! Every notifier delivers to one subscriber. The payload is always the JSON
//! document produced by `Notification::to_json`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use twilio::TwilioService;

use crate::domains::feedback::notification::Notification;
use crate::kernel::BaseNotifier;

/// Writes notifications to the log. Used in development.
pub struct LogNotifier {
    subscriber: String,
}

impl LogNotifier {
    pub fn new(subscriber: impl Into<String>) -> Self {
        Self {
            subscriber: subscriber.into(),
        }
    }
}

#[async_trait]
impl BaseNotifier for LogNotifier {
    async fn publish(&self, notification: &Notification) -> Result<()> {
        let payload = notification.to_json()?;
        info!(
            subscriber = %self.subscriber,
            detected_sentiment = %notification.detected_sentiment,
            payload = %payload,
            "Customer support notification"
        );
        Ok(())
    }
}

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// POSTs the notification JSON to a URL.
pub struct WebhookNotifier {
    client: Client,
    url: String,
    subscriber: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, subscriber: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            url: url.into(),
            subscriber: subscriber.into(),
        })
    }
}

#[async_trait]
impl BaseNotifier for WebhookNotifier {
    async fn publish(&self, notification: &Notification) -> Result<()> {
        info!("Sending support notification to webhook: {}", self.url);

        let response = self
            .client
            .post(&self.url)
            .header("X-Feedback-Subscriber", &self.subscriber)
            .json(notification)
            .send()
            .await
            .context("Webhook request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Support webhook returned {}: {}", status, body);
            anyhow::bail!("Support webhook returned {}: {}", status, body);
        }

        Ok(())
    }
}

/// Sends the notification JSON as an SMS to the subscriber's phone number.
pub struct TwilioNotifier {
    service: Arc<TwilioService>,
    subscriber: String,
}

impl TwilioNotifier {
    pub fn new(service: Arc<TwilioService>, subscriber: impl Into<String>) -> Self {
        Self {
            service,
            subscriber: subscriber.into(),
        }
    }
}

#[async_trait]
impl BaseNotifier for TwilioNotifier {
    async fn publish(&self, notification: &Notification) -> Result<()> {
        let body = notification.to_json()?;
        let message = self
            .service
            .send_message(&self.subscriber, &body)
            .await
            .map_err(|e| anyhow::anyhow!("{}", e))?;

        info!(sid = %message.sid, status = %message.status, "Support SMS queued");
        Ok(())
    }
}
