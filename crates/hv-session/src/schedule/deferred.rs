//! A single coalescing slot.

use std::time::Instant;

use super::policy::Coalesce;

#[derive(Debug, Clone)]
struct Pending<T> {
    value: T,
    scheduled_at: Instant,
}

/// Holds at most one pending value, released according to a [`Coalesce`]
/// policy.
///
/// There is no explicit cancel of a superseded value: scheduling replaces
/// it before it is ever released.
#[derive(Debug, Clone)]
pub struct Deferred<T> {
    policy: Coalesce,
    pending: Option<Pending<T>>,
    superseded: u64,
}

impl<T> Deferred<T> {
    pub fn new(policy: Coalesce) -> Self {
        Self {
            policy,
            pending: None,
            superseded: 0,
        }
    }

    pub fn policy(&self) -> Coalesce {
        self.policy
    }

    /// Schedules a value, replacing any pending one.
    ///
    /// Returns true if a pending value was superseded. For a trailing delay
    /// the deadline restarts at `now`.
    pub fn schedule(&mut self, value: T, now: Instant) -> bool {
        let replaced = self.pending.is_some();
        if replaced {
            self.superseded += 1;
        }
        self.pending = Some(Pending {
            value,
            scheduled_at: now,
        });
        replaced
    }

    /// Releases the pending value if it is due at `now`.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|p| self.policy.is_due(p.scheduled_at, now));
        if due {
            self.pending.take().map(|p| p.value)
        } else {
            None
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending value becomes due, if there is one.
    pub fn due_at(&self) -> Option<Instant> {
        self.pending
            .as_ref()
            .map(|p| self.policy.due_at(p.scheduled_at))
    }

    /// Number of values replaced before release.
    pub fn superseded(&self) -> u64 {
        self.superseded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_next_tick_releases_latest_value_once() {
        let t0 = Instant::now();
        let mut slot = Deferred::new(Coalesce::NextTick);
        assert_eq!(slot.poll(t0), None);

        assert!(!slot.schedule(1, t0));
        assert!(slot.schedule(2, t0));
        assert!(slot.schedule(3, t0));

        assert_eq!(slot.poll(t0), Some(3));
        assert_eq!(slot.poll(t0), None);
        assert_eq!(slot.superseded(), 2);
    }

    #[test]
    fn test_trailing_delay_restarts_on_schedule() {
        let t0 = Instant::now();
        let ms = Duration::from_millis;
        let mut slot = Deferred::new(Coalesce::TrailingDelay(ms(100)));

        slot.schedule("a", t0);
        assert_eq!(slot.poll(t0 + ms(50)), None);

        // A burst keeps pushing the deadline out
        slot.schedule("b", t0 + ms(80));
        assert_eq!(slot.poll(t0 + ms(120)), None);
        assert_eq!(slot.due_at(), Some(t0 + ms(180)));

        assert_eq!(slot.poll(t0 + ms(180)), Some("b"));
        assert!(!slot.is_pending());
    }
}
