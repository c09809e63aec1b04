//! Error taxonomy shared across the engine.
//!
//! Filter errors are a distinct type from general processing faults so
//! the executor can tell "drop this item" apart from "something broke".

use std::fmt;

use chrono::{DateTime, Utc};

use crate::metadata::Metadata;

/// Why a filter processor dropped an item. Not a fault — logged at info,
/// the chain simply stops here.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterReason {
    pub processor: String,
    pub reason: String,
}

impl FilterReason {
    pub fn new(processor: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            processor: processor.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FilterReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.processor, self.reason)
    }
}

/// The result of running one processor node.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    /// The item was intentionally dropped. Not a pipeline failure.
    #[error("filtered by {0}")]
    Filtered(FilterReason),
    /// Anything else — aborts the chain and propagates to the caller.
    #[error(transparent)]
    Fault(#[from] anyhow::Error),
}

impl ChainError {
    pub fn filtered(processor: impl Into<String>, reason: impl Into<String>) -> Self {
        ChainError::Filtered(FilterReason::new(processor, reason))
    }

    pub fn is_filtered(&self) -> bool {
        matches!(self, ChainError::Filtered(_))
    }
}

/// A source's fetch failed for this tick. The route is aborted; the
/// source will be retried on the next tick.
#[derive(Debug, thiserror::Error)]
#[error("source error: {0}")]
pub struct SourceError(pub String);

impl SourceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<anyhow::Error> for SourceError {
    fn from(e: anyhow::Error) -> Self {
        SourceError(e.to_string())
    }
}

/// The outcome of one publish attempt to one target. Targets report
/// failures through this struct
/// rather than `Result::Err` so `metadata` (e.g. `retry_after`) is
/// always available regardless of success.
#[derive(Debug, Clone)]
pub struct PublishResult {
    pub success: bool,
    pub target_name: String,
    pub item_id: String,
    pub timestamp: DateTime<Utc>,
    pub error: Option<String>,
    pub metadata: Metadata,
}

impl PublishResult {
    pub fn ok(target_name: impl Into<String>, item_id: impl Into<String>) -> Self {
        Self {
            success: true,
            target_name: target_name.into(),
            item_id: item_id.into(),
            timestamp: Utc::now(),
            error: None,
            metadata: Metadata::new(),
        }
    }

    pub fn fail(
        target_name: impl Into<String>,
        item_id: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            target_name: target_name.into(),
            item_id: item_id.into(),
            timestamp: Utc::now(),
            error: Some(error.into()),
            metadata: Metadata::new(),
        }
    }

    pub fn with_retry_after(mut self, seconds: f64) -> Self {
        self.metadata
            .insert("retry_after".to_string(), crate::metadata::MetadataValue::Float(seconds));
        self
    }

    /// Advisory override for the dispatcher's back-off schedule, in seconds.
    pub fn retry_after(&self) -> Option<f64> {
        self.metadata.get("retry_after").and_then(|v| v.as_float())
    }
}

/// Raised once the dispatcher has exhausted retries for a `(item, target)`
/// pair. Affects only that pair; the route continues with other targets.
#[derive(Debug, thiserror::Error)]
#[error("publish to target '{target}' failed after {attempts} attempts: {last_error}")]
pub struct DispatchError {
    pub target: String,
    pub attempts: u32,
    pub last_error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_after_round_trips() {
        let r = PublishResult::fail("chat", "id1", "rate limited").with_retry_after(2.0);
        assert_eq!(r.retry_after(), Some(2.0));
    }

    #[test]
    fn filtered_error_is_distinguishable() {
        let err = ChainError::filtered("score_filter", "score below minimum");
        assert!(err.is_filtered());
        let other = ChainError::Fault(anyhow::anyhow!("boom"));
        assert!(!other.is_filtered());
    }
}
