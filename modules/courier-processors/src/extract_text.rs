use async_trait::async_trait;
use courier_executor::{Processor, StateAccessor};
use courier_types::{ChainError, Item};

/// Pulls plain text out of an item's opaque `content` JSON for
/// downstream text analysis (keyword filtering, summarization). Reads
/// the first present field in `fields`, defaulting to `"content"` /
/// `"body"` / `"text"`.
pub struct ExtractText {
    fields: Vec<String>,
}

impl ExtractText {
    pub fn new(fields: Vec<String>) -> Self {
        let fields = if fields.is_empty() {
            vec!["content".to_string(), "body".to_string(), "text".to_string()]
        } else {
            fields
        };
        Self { fields }
    }
}

impl Default for ExtractText {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl Processor for ExtractText {
    fn name(&self) -> &str {
        "extract_text"
    }

    fn depends_on(&self) -> &[String] {
        &[]
    }

    async fn process(&self, _state: &StateAccessor, item: &Item) -> Result<(), ChainError> {
        let content = item.content();
        let text = self
            .fields
            .iter()
            .find_map(|field| content.get(field).and_then(|v| v.as_str()))
            .unwrap_or_default()
            .to_string();
        item.set_text_content(text).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn extracts_first_matching_field() {
        let extractor = ExtractText::default();
        let item = Item::new("id", "src", Utc::now(), json!({"body": "hello world"}));
        let state = StateAccessor::default();
        extractor.process(&state, &item).await.unwrap();
        assert_eq!(item.text_content().await, "hello world");
    }

    #[tokio::test]
    async fn missing_fields_yield_empty_text() {
        let extractor = ExtractText::default();
        let item = Item::new("id", "src", Utc::now(), json!({"unrelated": 1}));
        let state = StateAccessor::default();
        extractor.process(&state, &item).await.unwrap();
        assert_eq!(item.text_content().await, "");
    }
}
