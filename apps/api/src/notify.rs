//! Notification collaborator — fire-and-forget email delivery.
//!
//! Delivery failures are logged and never propagated: no request outcome
//! depends on whether a notification landed.

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

/// Outbound notification contract.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str, is_html: bool);
}

/// Posts messages to an HTTP mail relay.
pub struct WebhookMailer {
    client: reqwest::Client,
    webhook_url: String,
}

impl WebhookMailer {
    pub fn new(webhook_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            webhook_url,
        }
    }
}

#[async_trait]
impl Notifier for WebhookMailer {
    async fn send(&self, to: &str, subject: &str, body: &str, is_html: bool) {
        let payload = json!({
            "to": to,
            "subject": subject,
            "body": body,
            "html": is_html,
        });

        match self.client.post(&self.webhook_url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {
                info!("Notification sent to {to}: {subject}");
            }
            Ok(response) => {
                warn!(
                    "Mail relay rejected notification to {to} with status {}",
                    response.status()
                );
            }
            Err(e) => {
                warn!("Failed to send notification to {to}: {e}");
            }
        }
    }
}

/// Drops notifications. Used when no mail relay is configured.
pub struct NoopMailer;

#[async_trait]
impl Notifier for NoopMailer {
    async fn send(&self, to: &str, subject: &str, _body: &str, _is_html: bool) {
        info!("Mail relay not configured; dropping notification to {to}: {subject}");
    }
}
