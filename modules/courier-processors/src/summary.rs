use async_trait::async_trait;
use courier_executor::{Processor, StateAccessor};
use courier_types::{ChainError, Item};

/// Clamps `text_content` to a maximum length, writing the result into
/// `metadata.summary`. The LLM-backed summarizer itself is out of
/// scope for this core; this is the one concrete transform that
/// survives in its place.
pub struct SummaryClamp {
    max_chars: usize,
    depends_on: Vec<String>,
}

impl SummaryClamp {
    pub fn new(max_chars: usize) -> Self {
        Self {
            max_chars,
            depends_on: vec![
                "score_filter".to_string(),
                "keyword_filter".to_string(),
                "extract_text".to_string(),
            ],
        }
    }
}

#[async_trait]
impl Processor for SummaryClamp {
    fn name(&self) -> &str {
        "summary"
    }

    fn depends_on(&self) -> &[String] {
        &self.depends_on
    }

    async fn process(&self, _state: &StateAccessor, item: &Item) -> Result<(), ChainError> {
        let text = item.text_content().await;
        let clamped: String = text.chars().take(self.max_chars).collect();
        item.set_metadata("summary", clamped).await;
        Ok(())
    }
}
