//! Two-tier render scheduling.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::deferred::Deferred;
use super::policy::Coalesce;
use crate::error::HandlerError;
use crate::event::invoke;
use crate::publication::Publication;

/// Urgency class of a render consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsumerClass {
    /// Visible consumers, served at the next tick.
    Primary,
    /// Background consumers, served after a trailing delay.
    Secondary,
}

impl ConsumerClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsumerClass::Primary => "primary",
            ConsumerClass::Secondary => "secondary",
        }
    }
}

impl fmt::Display for ConsumerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Handle returned by [`RenderScheduler::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConsumerId(u64);

/// What a tick delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderReport {
    pub primary: usize,
    pub secondary: usize,
    pub failed: usize,
}

impl RenderReport {
    pub fn is_idle(&self) -> bool {
        *self == RenderReport::default()
    }
}

type Consumer = Box<dyn FnMut(&Publication) -> Result<(), HandlerError>>;

struct Registration {
    id: ConsumerId,
    class: ConsumerClass,
    consumer: Consumer,
}

/// Delivers publications to render consumers at coalesced boundaries.
///
/// A publication first goes to primary consumers at the next tick. The same
/// publication is then queued for secondary consumers behind a trailing
/// delay, so a burst of filter changes reaches them only once it settles.
pub struct RenderScheduler {
    primary: Deferred<Arc<Publication>>,
    secondary: Deferred<Arc<Publication>>,
    consumers: Vec<Registration>,
    next_id: u64,
}

impl fmt::Debug for RenderScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderScheduler")
            .field("primary_pending", &self.primary.is_pending())
            .field("secondary_pending", &self.secondary.is_pending())
            .field("consumers", &self.consumers.len())
            .finish()
    }
}

impl RenderScheduler {
    pub fn new(secondary_delay: Duration) -> Self {
        Self {
            primary: Deferred::new(Coalesce::NextTick),
            secondary: Deferred::new(Coalesce::TrailingDelay(secondary_delay)),
            consumers: Vec::new(),
            next_id: 0,
        }
    }

    pub fn register<F>(&mut self, class: ConsumerClass, consumer: F) -> ConsumerId
    where
        F: FnMut(&Publication) -> Result<(), HandlerError> + 'static,
    {
        let id = ConsumerId(self.next_id);
        self.next_id += 1;
        self.consumers.push(Registration {
            id,
            class,
            consumer: Box::new(consumer),
        });
        id
    }

    pub fn unregister(&mut self, id: ConsumerId) -> bool {
        let before = self.consumers.len();
        self.consumers.retain(|r| r.id != id);
        self.consumers.len() != before
    }

    /// Queues a publication for the next tick, superseding any pending one.
    pub fn schedule(&mut self, publication: Arc<Publication>, now: Instant) {
        if self.primary.schedule(publication, now) {
            tracing::debug!("Superseded pending primary render");
        }
    }

    /// Delivers whatever is due at `now`.
    pub fn tick(&mut self, now: Instant) -> RenderReport {
        let mut report = RenderReport::default();

        if let Some(publication) = self.primary.poll(now) {
            let (delivered, failed) = self.deliver(ConsumerClass::Primary, &publication);
            report.primary = delivered;
            report.failed += failed;
            self.secondary.schedule(publication, now);
        }
        if let Some(publication) = self.secondary.poll(now) {
            let (delivered, failed) = self.deliver(ConsumerClass::Secondary, &publication);
            report.secondary = delivered;
            report.failed += failed;
        }
        report
    }

    /// Next instant at which [`tick`](Self::tick) would deliver something.
    pub fn next_due(&self) -> Option<Instant> {
        match (self.primary.due_at(), self.secondary.due_at()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.primary.is_pending() || self.secondary.is_pending()
    }

    fn deliver(&mut self, class: ConsumerClass, publication: &Publication) -> (usize, usize) {
        let mut delivered = 0;
        let mut failed = 0;
        for registration in self.consumers.iter_mut().filter(|r| r.class == class) {
            match invoke(|| (registration.consumer)(publication)) {
                Ok(()) => delivered += 1,
                Err(reason) => {
                    failed += 1;
                    tracing::warn!(
                        class = %class,
                        consumer = registration.id.0,
                        error = %reason,
                        "Render consumer failed"
                    );
                }
            }
        }
        (delivered, failed)
    }
}
