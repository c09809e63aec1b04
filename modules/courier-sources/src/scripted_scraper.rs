use async_trait::async_trait;
use courier_executor::StateAccessor;
use courier_types::{Item, SourceError};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use courier_pipeline::Source;

/// Placeholder for a scriptable/LLM-backed scraper source. The scripting
/// runtime itself is out of scope for this core; this type exists so a
/// `source.type = "scripted_scraper"` config entry fails at fetch time
/// with a clear message rather than at config-validation time, leaving
/// room for a real implementation to be slotted in later without a
/// config format change.
pub struct ScriptedScraperSource {
    name: String,
    script_path: String,
}

impl ScriptedScraperSource {
    pub fn new(name: impl Into<String>, script_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            script_path: script_path.into(),
        }
    }
}

#[async_trait]
impl Source for ScriptedScraperSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(
        &self,
        _token: CancellationToken,
        _state: StateAccessor,
    ) -> (mpsc::Receiver<Item>, oneshot::Receiver<Option<SourceError>>) {
        let (item_tx, item_rx) = mpsc::channel(1);
        let (err_tx, err_rx) = oneshot::channel();
        drop(item_tx);
        let _ = err_tx.send(Some(SourceError::new(format!(
            "scripted scraper source is not implemented (script: {})",
            self.script_path
        ))));
        (item_rx, err_rx)
    }
}
