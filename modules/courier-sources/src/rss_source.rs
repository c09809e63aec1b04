use async_trait::async_trait;
use courier_executor::StateAccessor;
use courier_types::{Item, SourceError};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use courier_pipeline::Source;

/// An RSS or Atom feed, parsed with `feed-rs` (which auto-detects the
/// format). Each feed entry becomes one item.
pub struct RssSource {
    name: String,
    client: reqwest::Client,
    feed_url: String,
}

impl RssSource {
    pub fn new(name: impl Into<String>, feed_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            client: reqwest::Client::new(),
            feed_url: feed_url.into(),
        }
    }
}

#[async_trait]
impl Source for RssSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(
        &self,
        token: CancellationToken,
        _state: StateAccessor,
    ) -> (mpsc::Receiver<Item>, oneshot::Receiver<Option<SourceError>>) {
        let (item_tx, item_rx) = mpsc::channel(32);
        let (err_tx, err_rx) = oneshot::channel();

        let body = match self.client.get(&self.feed_url).send().await {
            Ok(resp) => match resp.bytes().await {
                Ok(bytes) => bytes,
                Err(e) => {
                    let _ = err_tx.send(Some(SourceError::new(format!("reading feed body: {e}"))));
                    return (item_rx, err_rx);
                }
            },
            Err(e) => {
                let _ = err_tx.send(Some(SourceError::new(format!("fetching feed: {e}"))));
                return (item_rx, err_rx);
            }
        };

        let feed = match feed_rs::parser::parse(&body[..]) {
            Ok(feed) => feed,
            Err(e) => {
                let _ = err_tx.send(Some(SourceError::new(format!("parsing feed: {e}"))));
                return (item_rx, err_rx);
            }
        };

        for entry in feed.entries {
            if token.is_cancelled() {
                break;
            }
            let Some(link) = entry.links.first().map(|l| l.href.clone()) else {
                warn!(entry_id = entry.id, "feed entry has no link, skipping");
                continue;
            };
            let title = entry.title.map(|t| t.content).unwrap_or_default();
            let summary = entry.summary.map(|t| t.content).unwrap_or_default();
            let content_text = entry
                .content
                .and_then(|c| c.body)
                .unwrap_or_else(|| summary.clone());
            let timestamp = entry.published.or(entry.updated).unwrap_or_else(chrono::Utc::now);

            let item_id = Item::make_id(&self.name, &entry.id);
            let content = serde_json::json!({
                "title": title,
                "link": link,
                "summary": summary,
                "content": content_text,
            });
            let item = Item::new(item_id, self.name.clone(), timestamp, content);
            item.set_metadata("title", title).await;
            item.set_metadata("url", link).await;

            if item_tx.send(item).await.is_err() {
                break;
            }
        }

        let _ = err_tx.send(None);
        (item_rx, err_rx)
    }
}
