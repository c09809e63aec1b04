use async_trait::async_trait;
use courier_types::{ChainError, Item};

use crate::state::StateAccessor;

/// A single node in a processor chain. Variants differ only in their
/// internal state (counter, token pool, stemmer) — no inheritance
/// needed, just distinct implementations of this trait.
#[async_trait]
pub trait Processor: Send + Sync {
    /// Stable name, unique within a chain.
    fn name(&self) -> &str;

    /// Names of other nodes in the same chain that must run first.
    fn depends_on(&self) -> &[String];

    /// Mutate `item` in place. Returning `ChainError::Filtered` drops
    /// the item without failing the run; any other error aborts the
    /// chain and propagates as a pipeline fault for this item.
    async fn process(&self, state: &StateAccessor, item: &Item) -> Result<(), ChainError>;
}
