use std::sync::Arc;

use chrono::Utc;
use courier_dispatch::{Dispatcher, Target};
use courier_executor::{ProcessorChain, StateAccessor};
use courier_store::Store;
use courier_types::{ChainError, Item, ItemRecord};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::error::PipelineError;
use crate::source::Source;

/// Drives one source and routes its item stream to its target list,
/// per-item, through the processor chain and dispatcher.
pub struct SourceRoute {
    pub name: String,
    pub source: Arc<dyn Source>,
    pub targets: Vec<Arc<dyn Target>>,
    pub chain: Arc<ProcessorChain>,
    pub store: Arc<Store>,
    pub dispatcher: Arc<Dispatcher>,
}

impl SourceRoute {
    pub fn new(
        name: impl Into<String>,
        source: Arc<dyn Source>,
        targets: Vec<Arc<dyn Target>>,
        chain: Arc<ProcessorChain>,
        store: Arc<Store>,
        dispatcher: Arc<Dispatcher>,
    ) -> Self {
        Self {
            name: name.into(),
            source,
            targets,
            chain,
            store,
            dispatcher,
        }
    }

    /// Runs one tick: fetches from the source and processes every item
    /// it emits. Returns an error only for infrastructure-level
    /// failures (the source's fetch itself failing); per-item problems
    /// are handled internally and never propagate.
    #[instrument(skip_all, fields(route = %self.name))]
    pub async fn run_tick(&self, token: CancellationToken, state: StateAccessor) -> Result<(), PipelineError> {
        let (mut items, errors) = self.source.fetch(token.clone(), state.clone()).await;

        loop {
            tokio::select! {
                item = items.recv() => {
                    match item {
                        Some(item) => self.process_item(item, &state, &token).await,
                        None => break,
                    }
                }
                _ = token.cancelled() => {
                    info!("run cancelled, stopping item processing for this tick");
                    break;
                }
            }
        }

        match errors.await {
            Ok(Some(err)) => Err(PipelineError::SourceFailed {
                route: self.name.clone(),
                source: err,
            }),
            Ok(None) => Ok(()),
            Err(_) => Ok(()),
        }
    }

    async fn process_item(&self, item: Item, state: &StateAccessor, token: &CancellationToken) {
        let effective_targets: Vec<Arc<dyn Target>> = {
            let mut kept = Vec::with_capacity(self.targets.len());
            for target in &self.targets {
                match self.store.items.is_published(item.id(), target.name()).await {
                    Ok(true) => {}
                    Ok(false) => kept.push(Arc::clone(target)),
                    Err(e) => {
                        warn!(item_id = item.id(), target = target.name(), error = %e, "ledger lookup failed, treating target as unpublished");
                        kept.push(Arc::clone(target));
                    }
                }
            }
            kept
        };

        if effective_targets.is_empty() {
            info!(item_id = item.id(), "all targets already published, dropping item");
            return;
        }

        match self.chain.execute(state, &item).await {
            Ok(()) => {}
            Err(ChainError::Filtered(reason)) => {
                info!(item_id = item.id(), %reason, "item filtered by processor chain");
                return;
            }
            Err(ChainError::Fault(e)) => {
                warn!(item_id = item.id(), error = %e, "processor chain fault, dropping item for this tick");
                return;
            }
        }

        let record = ItemRecord {
            id: item.id().to_string(),
            content_hash: item.content_hash(),
            source: item.source().to_string(),
            timestamp: item.timestamp(),
            created_at: Utc::now(),
        };
        if let Err(e) = self.store.items.store(&record).await {
            warn!(item_id = item.id(), error = %e, "failed to upsert item record, dispatching anyway");
        }

        if let Err(e) = self.dispatcher.dispatch(&item, &effective_targets, token).await {
            warn!(item_id = item.id(), error = %e, "dispatch ended with a terminal target error");
        }
    }
}
