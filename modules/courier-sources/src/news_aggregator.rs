use async_trait::async_trait;
use chrono::{DateTime, Utc};
use courier_executor::StateAccessor;
use courier_types::{Item, SourceError};
use serde::Deserialize;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use courier_pipeline::Source;

#[derive(Debug, Deserialize)]
struct Story {
    id: u64,
    title: Option<String>,
    url: Option<String>,
    score: Option<i64>,
    time: Option<i64>,
}

/// A two-step "front page" JSON news API: a list endpoint returning
/// story ids, and an item endpoint returning one story per id (the
/// shape of Hacker News' public API and similar link-aggregator APIs).
pub struct NewsAggregatorSource {
    name: String,
    client: reqwest::Client,
    list_url: String,
    item_url_template: String,
    limit: usize,
}

impl NewsAggregatorSource {
    pub fn new(name: impl Into<String>, list_url: impl Into<String>, item_url_template: impl Into<String>, limit: usize) -> Self {
        Self {
            name: name.into(),
            client: reqwest::Client::new(),
            list_url: list_url.into(),
            item_url_template: item_url_template.into(),
            limit,
        }
    }
}

fn item_url(item_url_template: &str, id: u64) -> String {
    item_url_template.replace("{id}", &id.to_string())
}

async fn fetch_story_ids(client: &reqwest::Client, list_url: &str) -> Result<Vec<u64>, SourceError> {
    client
        .get(list_url)
        .send()
        .await
        .map_err(|e| SourceError::new(format!("fetching story list: {e}")))?
        .json::<Vec<u64>>()
        .await
        .map_err(|e| SourceError::new(format!("decoding story list: {e}")))
}

async fn fetch_story(client: &reqwest::Client, item_url_template: &str, id: u64) -> Result<Story, SourceError> {
    client
        .get(item_url(item_url_template, id))
        .send()
        .await
        .map_err(|e| SourceError::new(format!("fetching story {id}: {e}")))?
        .json::<Story>()
        .await
        .map_err(|e| SourceError::new(format!("decoding story {id}: {e}")))
}

fn story_timestamp(story: &Story) -> DateTime<Utc> {
    story
        .time
        .and_then(|t| DateTime::from_timestamp(t, 0))
        .unwrap_or_else(Utc::now)
}

#[async_trait]
impl Source for NewsAggregatorSource {
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

        let name = self.name.clone();
        let client = self.client.clone();
        let list_url = self.list_url.clone();
        let item_url_template = self.item_url_template.clone();
        let limit = self.limit;

        // Spawned so the bounded channel's backpressure (the default
        // capacity of 32 can be smaller than `limit`) can't deadlock
        // `fetch` itself waiting on a consumer that only starts reading
        // after this call returns.
        tokio::spawn(async move {
            let ids = match fetch_story_ids(&client, &list_url).await {
                Ok(ids) => ids,
                Err(e) => {
                    let _ = err_tx.send(Some(e));
                    return;
                }
            };

            for id in ids.into_iter().take(limit) {
                if token.is_cancelled() {
                    break;
                }
                match fetch_story(&client, &item_url_template, id).await {
                    Ok(story) => {
                        let item_id = Item::make_id(&name, &id.to_string());
                        let timestamp = story_timestamp(&story);
                        let content = serde_json::json!({
                            "id": story.id,
                            "title": story.title,
                            "url": story.url,
                            "score": story.score,
                        });
                        let item = Item::new(item_id, name.clone(), timestamp, content);
                        if let Some(title) = &story.title {
                            item.set_metadata("title", title.clone()).await;
                        }
                        if let Some(score) = story.score {
                            item.set_metadata("score", score).await;
                        }
                        if let Some(url) = &story.url {
                            item.set_metadata("url", url.clone()).await;
                        }
                        tokio::select! {
                            result = item_tx.send(item) => {
                                if result.is_err() {
                                    break;
                                }
                            }
                            _ = token.cancelled() => break,
                        }
                    }
                    Err(e) => {
                        warn!(story_id = id, error = %e, "failed to fetch story, skipping");
                    }
                }
            }

            let _ = err_tx.send(None);
        });

        (item_rx, err_rx)
    }
}
