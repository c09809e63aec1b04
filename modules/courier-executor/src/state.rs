//! The capability bundle processors receive alongside the item.
//!
//! Rather than a god-object with named fields for every possible
//! collaborator (config, storage, registry, logger, pipeline, chain),
//! `StateAccessor` is a small type-keyed bag: each
//! collaborator is inserted once at bootstrap and retrieved by type.
//! Processors that don't need a collaborator never see its type.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

/// Immutable capability bundle built once at bootstrap and shared by
/// every processor invocation.
#[derive(Clone, Default)]
pub struct StateAccessor {
    values: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl StateAccessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a collaborator, consuming and returning `self` so
    /// bootstrap code can chain calls.
    pub fn with<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.values.insert(TypeId::of::<T>(), Arc::new(value));
        self
    }

    /// Fetch a previously-registered collaborator by type.
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.values
            .get(&TypeId::of::<T>())
            .and_then(|v| Arc::clone(v).downcast::<T>().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Widget(u32);

    #[test]
    fn round_trips_by_type() {
        let state = StateAccessor::new().with(Widget(7));
        assert_eq!(state.get::<Widget>().unwrap().0, 7);
        assert!(state.get::<String>().is_none());
    }
}
