//! A generic chat-platform webhook target (the shape of Slack/Discord
//! incoming webhooks): POSTs a JSON payload built from the item and
//! reports rate-limit hints back to the dispatcher via `retry_after`.

use std::time::Duration;

use async_trait::async_trait;
use courier_dispatch::Target;
use courier_types::{Item, PublishResult};
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Posts a message to a webhook URL for every published item. Honors a
/// `Retry-After` response header as the dispatcher's advisory back-off
/// override.
pub struct ChatWebhookTarget {
    name: String,
    webhook_url: String,
    http: reqwest::Client,
    pace: Duration,
}

impl ChatWebhookTarget {
    pub fn new(name: impl Into<String>, webhook_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            webhook_url: webhook_url.into(),
            http: reqwest::Client::new(),
            pace: Duration::from_secs(1),
        }
    }

    pub fn with_pace(mut self, pace: Duration) -> Self {
        self.pace = pace;
        self
    }

    async fn payload(item: &Item) -> serde_json::Value {
        let metadata = item.metadata_snapshot().await;
        let title = metadata.get("title").and_then(|v| v.as_str()).unwrap_or(item.id());
        let url = metadata.get("url").and_then(|v| v.as_str()).unwrap_or_default();
        let summary = metadata.get("summary").and_then(|v| v.as_str());

        let text = match summary {
            Some(summary) => format!("*{title}*\n{url}\n{summary}"),
            None => format!("*{title}*\n{url}"),
        };

        serde_json::json!({ "text": text, "unfurl_links": false })
    }
}

#[async_trait]
impl Target for ChatWebhookTarget {
    fn name(&self) -> &str {
        &self.name
    }

    async fn publish(&self, item: &Item) -> PublishResult {
        let payload = Self::payload(item).await;

        let response = match self.http.post(&self.webhook_url).json(&payload).send().await {
            Ok(response) => response,
            Err(e) => return PublishResult::fail(&self.name, item.id(), e.to_string()),
        };

        if response.status().is_success() {
            return PublishResult::ok(&self.name, item.id());
        }

        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<f64>().ok());

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        warn!(item_id = item.id(), target = %self.name, %status, body = %body, "chat webhook returned non-success");

        let result = PublishResult::fail(&self.name, item.id(), format!("webhook returned {status}"));
        match retry_after {
            Some(seconds) => result.with_retry_after(seconds),
            None => result,
        }
    }

    async fn pace(&self, token: &CancellationToken) {
        tokio::select! {
            _ = tokio::time::sleep(self.pace) => {}
            _ = token.cancelled() => {}
        }
    }
}
