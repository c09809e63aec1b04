//! `ProcessorChain` — the façade over `ProcessorGraph`.
//!
//! `with`/`with_multiple` register nodes; `build` computes the order;
//! `execute` runs it. Registering a node after `build` marks the chain
//! stale so the next `execute` fails until the caller rebuilds.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use anyhow::anyhow;
use courier_types::{ChainError, Item};
use tracing::{info, warn};

use crate::graph::{ExecutorError, ProcessorGraph};
use crate::processor::Processor;
use crate::state::StateAccessor;

enum ChainState {
    Fresh,
    Built(Arc<ProcessorGraph>),
    Stale,
}

/// The ordered collection of processor instances for one item type.
/// Shared across route tasks as `Arc<ProcessorChain>`; a read-write
/// lock makes `build` exclusive while `execute` takes a shared
/// snapshot of the current ordering.
pub struct ProcessorChain {
    nodes: RwLock<BTreeMap<String, Arc<dyn Processor>>>,
    state: RwLock<ChainState>,
}

impl Default for ProcessorChain {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessorChain {
    pub fn new() -> Self {
        Self {
            nodes: RwLock::new(BTreeMap::new()),
            state: RwLock::new(ChainState::Fresh),
        }
    }

    pub fn with(&self, name: impl Into<String>, processor: Arc<dyn Processor>) -> &Self {
        self.nodes.write().unwrap().insert(name.into(), processor);
        *self.state.write().unwrap() = ChainState::Stale;
        self
    }

    pub fn with_multiple(
        &self,
        processors: impl IntoIterator<Item = (String, Arc<dyn Processor>)>,
    ) -> &Self {
        let mut nodes = self.nodes.write().unwrap();
        for (name, processor) in processors {
            nodes.insert(name, processor);
        }
        *self.state.write().unwrap() = ChainState::Stale;
        self
    }

    /// Compute the topological order. Idempotent; safe to call again
    /// after further `with`/`with_multiple` calls.
    pub fn build(&self) -> Result<(), ExecutorError> {
        let nodes = self.nodes.read().unwrap().clone();
        let node_count = nodes.len();
        let graph = ProcessorGraph::build(nodes)?;
        info!(nodes = node_count, "processor chain built");
        *self.state.write().unwrap() = ChainState::Built(Arc::new(graph));
        Ok(())
    }

    /// Run the chain against `item`. Fails with a `ChainError::Fault`
    /// if the chain has never been built or was marked stale by a
    /// `with`/`with_multiple` call since the last `build`.
    pub async fn execute(&self, state: &StateAccessor, item: &Item) -> Result<(), ChainError> {
        let graph = {
            let guard = self.state.read().unwrap();
            match &*guard {
                ChainState::Built(graph) => Arc::clone(graph),
                ChainState::Fresh => {
                    return Err(ChainError::Fault(anyhow!("processor chain not built")))
                }
                ChainState::Stale => {
                    return Err(ChainError::Fault(anyhow!(
                        "processor chain is stale: call build() again after registering nodes"
                    )))
                }
            }
        };

        match graph.execute(state, item).await {
            Ok(()) => Ok(()),
            Err(ChainError::Filtered(reason)) => {
                info!(%reason, item_id = item.id(), "item filtered");
                Err(ChainError::Filtered(reason))
            }
            Err(fault) => {
                warn!(error = %fault, item_id = item.id(), "processor chain fault");
                Err(fault)
            }
        }
    }
}
