//! Coalescing policies.

use std::time::{Duration, Instant};

/// When a scheduled value becomes deliverable.
///
/// Both policies coalesce: scheduling again before delivery replaces the
/// pending value (last write wins).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coalesce {
    /// Deliverable at the next tick.
    NextTick,
    /// Deliverable once the delay has passed since the latest schedule.
    TrailingDelay(Duration),
}

impl Coalesce {
    /// Returns true if a value scheduled at `scheduled_at` is due at `now`.
    pub fn is_due(&self, scheduled_at: Instant, now: Instant) -> bool {
        match self {
            Coalesce::NextTick => true,
            Coalesce::TrailingDelay(delay) => now.saturating_duration_since(scheduled_at) >= *delay,
        }
    }

    /// Earliest instant at which a value scheduled at `scheduled_at` is due.
    pub fn due_at(&self, scheduled_at: Instant) -> Instant {
        match self {
            Coalesce::NextTick => scheduled_at,
            Coalesce::TrailingDelay(delay) => scheduled_at + *delay,
        }
    }
}
