use async_trait::async_trait;
use courier_executor::StateAccessor;
use courier_types::{Item, SourceError};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

/// An upstream that emits a finite, non-restartable stream of items for
/// one tick. The item channel MUST be closed (dropped) when the source
/// has emitted everything it intends to, on both success and error
/// paths; an error on the error channel terminates the route for this
/// tick.
#[async_trait]
pub trait Source: Send + Sync {
    fn name(&self) -> &str;

    async fn initialize(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn fetch(
        &self,
        token: CancellationToken,
        state: StateAccessor,
    ) -> (mpsc::Receiver<Item>, oneshot::Receiver<Option<SourceError>>);

    async fn shutdown(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
