use async_trait::async_trait;
use courier_types::{Item, PublishResult};
use tokio_util::sync::CancellationToken;

/// A downstream a dispatcher can publish items to (a chat webhook, the
/// served feed store, ...).
#[async_trait]
pub trait Target: Send + Sync {
    fn name(&self) -> &str;

    async fn initialize(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn publish(&self, item: &Item) -> PublishResult;

    /// Optional pacing hook invoked before the 2nd...Nth fan-out
    /// publish to this target within one dispatch, to space out calls
    /// to the same external service. Default: no pacing.
    async fn pace(&self, _token: &CancellationToken) {}

    async fn shutdown(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
