use async_trait::async_trait;
use chrono::{DateTime, Utc};
use courier_executor::{Processor, StateAccessor};
use courier_types::{ChainError, Item};

/// Drops items whose timestamp falls outside `[after, before]`. Either
/// bound may be absent.
pub struct PublishedAtFilter {
    after: Option<DateTime<Utc>>,
    before: Option<DateTime<Utc>>,
    depends_on: Vec<String>,
}

impl PublishedAtFilter {
    pub fn new(after: Option<DateTime<Utc>>, before: Option<DateTime<Utc>>) -> Self {
        Self {
            after,
            before,
            depends_on: vec!["dedupe".to_string()],
        }
    }
}

#[async_trait]
impl Processor for PublishedAtFilter {
    fn name(&self) -> &str {
        "published_at_filter"
    }

    fn depends_on(&self) -> &[String] {
        &self.depends_on
    }

    async fn process(&self, _state: &StateAccessor, item: &Item) -> Result<(), ChainError> {
        let ts = item.timestamp();
        if let Some(after) = self.after {
            if ts < after {
                return Err(ChainError::filtered(self.name(), "timestamp before configured after bound"));
            }
        }
        if let Some(before) = self.before {
            if ts > before {
                return Err(ChainError::filtered(self.name(), "timestamp after configured before bound"));
            }
        }
        Ok(())
    }
}
