use std::sync::Arc;
use std::time::Duration;

use courier_store::Store;
use courier_types::{DispatchError, Item};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::target::Target;

const MAX_RETRIES: u32 = 3;

/// Fans an item out to its targets, one task per target, retrying each
/// with exponential back-off and writing the publish ledger on success.
pub struct Dispatcher {
    store: Arc<Store>,
    max_retries: u32,
}

impl Dispatcher {
    pub fn new(store: Arc<Store>) -> Self {
        Self {
            store,
            max_retries: MAX_RETRIES,
        }
    }

    pub fn with_max_retries(store: Arc<Store>, max_retries: u32) -> Self {
        Self { store, max_retries }
    }

    /// Publishes `item` to every target concurrently. Returns the first
    /// target error encountered, if any; every target is still awaited
    /// to completion regardless (§4.4's "others continue but their
    /// results are swallowed").
    pub async fn dispatch(
        &self,
        item: &Item,
        targets: &[Arc<dyn Target>],
        token: &CancellationToken,
    ) -> Result<(), DispatchError> {
        let mut handles = Vec::with_capacity(targets.len());
        for (index, target) in targets.iter().enumerate() {
            let target = Arc::clone(target);
            let item = item.clone();
            let token = token.clone();
            let store = Arc::clone(&self.store);
            let max_retries = self.max_retries;
            handles.push(tokio::spawn(async move {
                if index > 0 {
                    target.pace(&token).await;
                }
                publish_with_retry(target.as_ref(), &item, max_retries, &token, &store).await
            }));
        }

        let results = futures::future::join_all(handles).await;
        let mut first_error = None;
        for result in results {
            match result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
                Err(join_error) => {
                    if first_error.is_none() {
                        first_error = Some(DispatchError {
                            target: "unknown".to_string(),
                            attempts: 0,
                            last_error: join_error.to_string(),
                        });
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

async fn publish_with_retry(
    target: &dyn Target,
    item: &Item,
    max_retries: u32,
    token: &CancellationToken,
    store: &Store,
) -> Result<(), DispatchError> {
    let mut attempt = 0u32;
    let mut last_error = String::new();

    loop {
        let result = target.publish(item).await;
        if result.success {
            if let Err(e) = store.items.mark_published(item.id(), target.name()).await {
                warn!(item_id = item.id(), target = target.name(), error = %e, "publish succeeded but ledger write failed, will retry next tick");
            }
            info!(item_id = item.id(), target = target.name(), attempt, "publish succeeded");
            return Ok(());
        }

        last_error = result.error.clone().unwrap_or_else(|| "publish failed".to_string());

        if attempt >= max_retries {
            return Err(DispatchError {
                target: target.name().to_string(),
                attempts: attempt + 1,
                last_error,
            });
        }

        let backoff = Duration::from_secs(2u64.pow(attempt));
        let wait_for = result
            .retry_after()
            .map(Duration::from_secs_f64)
            .unwrap_or(backoff);

        tokio::select! {
            _ = tokio::time::sleep(wait_for) => {}
            _ = token.cancelled() => {
                return Err(DispatchError {
                    target: target.name().to_string(),
                    attempts: attempt + 1,
                    last_error: "cancelled during retry back-off".to_string(),
                });
            }
        }

        attempt += 1;
    }
}
