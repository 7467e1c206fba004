//! Recording observer for tests.
//!
//! Available behind the `test-utils` feature flag.

use crate::{Observer, ObserverError, SessionEvent};
use async_trait::async_trait;
use std::sync::Mutex;

/// An observer that records every event it receives.
/// Use `.events()` to inspect what was recorded.
pub struct RecordingObserver {
    events: Mutex<Vec<SessionEvent>>,
}

impl RecordingObserver {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of all recorded events.
    pub fn events(&self) -> Vec<SessionEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Kinds of all recorded events, in order.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(SessionEvent::kind).collect()
    }
}

impl Default for RecordingObserver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Observer for RecordingObserver {
    async fn on_event(&self, event: &SessionEvent) -> Result<(), ObserverError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}
