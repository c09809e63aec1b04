//! The DAG executor and processor chain façade:
//! topologically sorts named processor nodes and runs them in order
//! against a single item.

mod chain;
mod graph;
mod processor;
mod state;

#[cfg(test)]
mod test_support;

pub use chain::ProcessorChain;
pub use graph::{ExecutorError, ProcessorGraph};
pub use processor::Processor;
pub use state::StateAccessor;
