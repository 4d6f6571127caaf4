use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

use crate::record::EventId;

/// Default number of event IDs remembered before the oldest is evicted.
pub const DEFAULT_CAPACITY: usize = 10_000;

/// Bounded recently-seen-event cache used by consumers to discard duplicates.
///
/// In-memory and per-process: it dedups only within one consumer instance's
/// recent history and resets on restart, which is why handlers must stay
/// idempotent on their own.
#[derive(Debug)]
pub struct IdempotencyGuard {
    inner: Mutex<GuardState>,
    capacity: usize,
}

#[derive(Debug, Default)]
struct GuardState {
    seen: HashSet<EventId>,
    order: VecDeque<EventId>,
}

impl IdempotencyGuard {
    /// Creates a guard with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a guard remembering at most `capacity` event IDs.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(GuardState::default()),
            capacity,
        }
    }

    /// Records the event ID, returning true if this is its first sighting.
    ///
    /// A false return means the delivery is a duplicate and the handler
    /// should be skipped.
    pub fn first_sighting(&self, event_id: EventId) -> bool {
        let mut state = self.inner.lock().expect("idempotency guard poisoned");

        if state.seen.contains(&event_id) {
            return false;
        }

        state.seen.insert(event_id);
        state.order.push_back(event_id);

        while state.order.len() > self.capacity {
            if let Some(oldest) = state.order.pop_front() {
                state.seen.remove(&oldest);
            }
        }

        true
    }

    /// Forgets an event ID so its next delivery counts as a first sighting.
    ///
    /// Called when a handler fails: the delivery did not take effect, so a
    /// redelivery must reach the handler again.
    pub fn forget(&self, event_id: EventId) {
        let mut state = self.inner.lock().expect("idempotency guard poisoned");
        if state.seen.remove(&event_id) {
            state.order.retain(|id| *id != event_id);
        }
    }

    /// Returns the number of event IDs currently remembered.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("idempotency guard poisoned").order.len()
    }

    /// Returns true if no event IDs are remembered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for IdempotencyGuard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sighting_then_duplicate() {
        let guard = IdempotencyGuard::new();
        let id = EventId::new();

        assert!(guard.first_sighting(id));
        assert!(!guard.first_sighting(id));
    }

    #[test]
    fn distinct_ids_are_all_first_sightings() {
        let guard = IdempotencyGuard::new();
        assert!(guard.first_sighting(EventId::new()));
        assert!(guard.first_sighting(EventId::new()));
        assert_eq!(guard.len(), 2);
    }

    #[test]
    fn oldest_entry_evicted_past_capacity() {
        let guard = IdempotencyGuard::with_capacity(3);
        let first = EventId::new();

        guard.first_sighting(first);
        guard.first_sighting(EventId::new());
        guard.first_sighting(EventId::new());
        guard.first_sighting(EventId::new());

        assert_eq!(guard.len(), 3);
        // The evicted ID is treated as new again.
        assert!(guard.first_sighting(first));
    }

    #[test]
    fn forgotten_id_counts_as_new_again() {
        let guard = IdempotencyGuard::new();
        let id = EventId::new();

        assert!(guard.first_sighting(id));
        guard.forget(id);

        assert!(guard.first_sighting(id));
        assert_eq!(guard.len(), 1);
    }

    #[test]
    fn forgetting_an_unknown_id_is_a_no_op() {
        let guard = IdempotencyGuard::new();
        guard.first_sighting(EventId::new());

        guard.forget(EventId::new());
        assert_eq!(guard.len(), 1);
    }
}
