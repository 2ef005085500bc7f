//! Deferred-event queue.
//!
//! Replaces wall-clock timers for delayed reactions: events are
//! scheduled against simulation time and drained once per tick, so
//! replays of the same tick stream produce the same reactions.

/// A queue of items that become due at fixed simulation times.
#[derive(Debug, Clone, Default)]
pub struct DeferredQueue<T> {
    entries: Vec<(u64, T)>,
}

impl<T> DeferredQueue<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Schedules an item to become due at `due_at_ms`.
    pub fn schedule(&mut self, due_at_ms: u64, item: T) {
        self.entries.push((due_at_ms, item));
    }

    /// Removes and returns all items due at or before `now_ms`,
    /// ordered by due time (ties keep insertion order).
    pub fn drain_due(&mut self, now_ms: u64) -> Vec<T> {
        let mut due = Vec::new();
        let mut remaining = Vec::with_capacity(self.entries.len());
        for (at, item) in self.entries.drain(..) {
            if at <= now_ms {
                due.push((at, item));
            } else {
                remaining.push((at, item));
            }
        }
        self.entries = remaining;
        // Stable sort keeps insertion order for items due at the same time.
        due.sort_by_key(|&(at, _)| at);
        due.into_iter().map(|(_, item)| item).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
