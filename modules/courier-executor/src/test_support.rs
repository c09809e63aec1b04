//! Minimal `Processor` stand-ins shared by this crate's unit tests.

use async_trait::async_trait;
use courier_types::{ChainError, Item};

use crate::processor::Processor;
use crate::state::StateAccessor;

pub(crate) struct StubProcessor {
    name: String,
    depends_on: Vec<String>,
    filter: bool,
}

impl StubProcessor {
    pub(crate) fn new(name: &str, depends_on: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            depends_on: depends_on.iter().map(|s| s.to_string()).collect(),
            filter: false,
        }
    }

    pub(crate) fn filtering(name: &str, depends_on: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            depends_on: depends_on.iter().map(|s| s.to_string()).collect(),
            filter: true,
        }
    }
}

#[async_trait]
impl Processor for StubProcessor {
    fn name(&self) -> &str {
        &self.name
    }

    fn depends_on(&self) -> &[String] {
        &self.depends_on
    }

    async fn process(&self, _state: &StateAccessor, item: &Item) -> Result<(), ChainError> {
        if self.filter {
            return Err(ChainError::filtered(self.name.clone(), "stub filter"));
        }
        item.set_metadata(format!("ran_{}", self.name), true).await;
        Ok(())
    }
}
