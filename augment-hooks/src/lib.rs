#![deny(missing_docs)]
//! Session events and the observer pipeline.
//!
//! The turn loop reports what it shows the caller (the user message, tool
//! calls and results, assistant replies) as [`SessionEvent`]s. The
//! [`ObserverRegistry`] delivers each event to every registered
//! [`Observer`] in registration order. Observer errors are logged and the
//! pipeline continues.

mod event;
mod tracing_observer;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use event::SessionEvent;
pub use tracing_observer::TracingObserver;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Error returned by an observer.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ObserverError {
    /// The observer could not process the event.
    #[error("observer failed: {0}")]
    Failed(String),
}

/// Receives session events. Advisory only.
#[async_trait]
pub trait Observer: Send + Sync {
    /// Handle one event.
    async fn on_event(&self, event: &SessionEvent) -> Result<(), ObserverError>;
}

/// Ordered pipeline of observers.
#[derive(Clone, Default)]
pub struct ObserverRegistry {
    observers: Vec<Arc<dyn Observer>>,
}

impl ObserverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    /// Add an observer to the end of the pipeline.
    pub fn add(&mut self, observer: Arc<dyn Observer>) {
        self.observers.push(observer);
    }

    /// Number of observers.
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Whether no observers are registered.
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Deliver `event` to every observer.
    pub async fn dispatch(&self, event: &SessionEvent) {
        for observer in &self.observers {
            if let Err(e) = observer.on_event(event).await {
                tracing::warn!(event = event.kind(), error = %e, "augment.observer.failed");
            }
        }
    }
}
