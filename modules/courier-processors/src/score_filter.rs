use async_trait::async_trait;
use courier_executor::{Processor, StateAccessor};
use courier_types::{ChainError, Item};

/// Drops items whose `metadata.score` is below `minimum`.
pub struct ScoreFilter {
    minimum: i64,
    depends_on: Vec<String>,
}

impl ScoreFilter {
    pub fn new(minimum: i64) -> Self {
        Self {
            minimum,
            depends_on: vec!["dedupe".to_string()],
        }
    }
}

#[async_trait]
impl Processor for ScoreFilter {
    fn name(&self) -> &str {
        "score_filter"
    }

    fn depends_on(&self) -> &[String] {
        &self.depends_on
    }

    async fn process(&self, _state: &StateAccessor, item: &Item) -> Result<(), ChainError> {
        let score = item.get_metadata("score").await.and_then(|v| v.as_int());
        match score {
            Some(score) if score >= self.minimum => Ok(()),
            _ => Err(ChainError::filtered(
                self.name(),
                format!("score below minimum {}", self.minimum),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use courier_types::MetadataValue;
    use serde_json::json;

    use super::*;

    async fn item_with_score(score: i64) -> Item {
        let item = Item::new("id", "source", Utc::now(), json!({}));
        item.set_metadata("score", MetadataValue::Int(score)).await;
        item
    }

    #[tokio::test]
    async fn passes_items_at_or_above_minimum() {
        let filter = ScoreFilter::new(100);
        let item = item_with_score(150).await;
        let state = StateAccessor::default();
        assert!(filter.process(&state, &item).await.is_ok());
    }

    #[tokio::test]
    async fn drops_items_below_minimum() {
        let filter = ScoreFilter::new(100);
        let item = item_with_score(5).await;
        let state = StateAccessor::default();
        let err = filter.process(&state, &item).await.unwrap_err();
        assert!(err.is_filtered());
    }

    #[tokio::test]
    async fn drops_items_missing_score() {
        let filter = ScoreFilter::new(100);
        let item = Item::new("id", "source", Utc::now(), json!({}));
        let state = StateAccessor::default();
        let err = filter.process(&state, &item).await.unwrap_err();
        assert!(err.is_filtered());
    }
}
