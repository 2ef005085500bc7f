//! Simulation tick clock.
//!
//! The core never touches OS timers. A host samples its clock once per
//! simulation tick and hands the same `TickClock` to every call made that
//! tick, so all cooldowns and commitment windows reduce to plain
//! elapsed-millisecond comparisons and replays stay deterministic.

use serde::{Deserialize, Serialize};

/// A point in simulation time: a monotonic tick index plus the elapsed
/// simulation time in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickClock {
    /// Monotonically increasing simulation tick.
    pub tick: u64,
    /// Elapsed simulation time in milliseconds.
    pub now_ms: u64,
}

impl TickClock {
    /// Creates a clock at the given tick and time.
    pub fn new(tick: u64, now_ms: u64) -> Self {
        Self { tick, now_ms }
    }

    /// Creates a clock at the start of the simulation.
    pub fn start() -> Self {
        Self { tick: 0, now_ms: 0 }
    }

    /// Milliseconds elapsed since an earlier timestamp, saturating at 0
    /// if the timestamp is in the future.
    pub fn elapsed_since(&self, earlier_ms: u64) -> u64 {
        self.now_ms.saturating_sub(earlier_ms)
    }

    /// Advances by one tick and the given number of milliseconds.
    pub fn advance(&mut self, delta_ms: u64) {
        self.tick += 1;
        self.now_ms += delta_ms;
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::start()
    }
}
