//! Shared types for the Courier content aggregation engine: the `Item`
//! that flows through the pipeline, its dynamically-typed metadata, the
//! durable record shapes, and the error taxonomy every other crate in
//! the workspace builds on.

mod error;
mod item;
mod metadata;
mod record;

pub use error::{ChainError, DispatchError, FilterReason, PublishResult, SourceError};
pub use item::Item;
pub use metadata::{Metadata, MetadataValue};
pub use record::{FeedEntry, FeedPage, ItemRecord, PublishLedgerRow};
