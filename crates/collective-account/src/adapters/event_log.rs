//! # Event Log Adapter
//!
//! Ordered in-memory recorder for account notifications. Production
//! adapters would publish to an event bus under `events::topics`.

use crate::events::AccountEvent;
use crate::ports::outbound::EventSink;
use std::sync::RwLock;

/// Records every emitted event in order.
#[derive(Debug, Default)]
pub struct InMemoryEventLog {
    events: RwLock<Vec<AccountEvent>>,
}

impl InMemoryEventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All events emitted so far, in order.
    #[must_use]
    pub fn events(&self) -> Vec<AccountEvent> {
        self.events.read().unwrap().clone()
    }

    /// Number of events emitted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().unwrap().len()
    }

    /// Returns true if nothing has been emitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().unwrap().is_empty()
    }

    /// Number of emitted events matching `predicate`.
    pub fn count_matching(&self, predicate: impl Fn(&AccountEvent) -> bool) -> usize {
        self.events
            .read()
            .unwrap()
            .iter()
            .filter(|event| predicate(event))
            .count()
    }
}

impl EventSink for InMemoryEventLog {
    fn emit(&self, event: AccountEvent) {
        self.events.write().unwrap().push(event);
    }
}

// =============================================================================
// TESTS
// =============================================================================
