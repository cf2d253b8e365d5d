//! Typed publish/subscribe for session events.
//!
//! Handlers run synchronously in subscription order. A handler that
//! returns an error or panics is logged and skipped; the remaining handlers
//! still see the event.

use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use hv_model::Row;

use crate::error::HandlerError;
use crate::publication::Publication;

/// Events published by a session.
#[derive(Debug, Clone)]
pub enum Event {
    /// Fires once when the session starts, with the full row collection.
    DatasetLoaded { rows: Arc<[Row]> },
    /// Fires after every completed filter application.
    FilteredSubsetChanged(Arc<Publication>),
    /// Fires when every predicate is reset to its default.
    SelectionCleared,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::DatasetLoaded { .. } => EventKind::DatasetLoaded,
            Event::FilteredSubsetChanged(_) => EventKind::FilteredSubsetChanged,
            Event::SelectionCleared => EventKind::SelectionCleared,
        }
    }
}

/// Names of the [`Event`] variants, used to subscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    DatasetLoaded,
    FilteredSubsetChanged,
    SelectionCleared,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::DatasetLoaded => "dataset-loaded",
            EventKind::FilteredSubsetChanged => "filtered-subset-changed",
            EventKind::SelectionCleared => "selection-cleared",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Outcome of one emission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitReport {
    /// Handlers that completed successfully.
    pub delivered: usize,
    /// Handlers that returned an error or panicked.
    pub failed: usize,
}

type Handler = Box<dyn FnMut(&Event) -> Result<(), HandlerError>>;

struct Subscription {
    id: SubscriptionId,
    kind: EventKind,
    handler: Handler,
}

/// Ordered registry of event handlers.
#[derive(Default)]
pub struct EventBus {
    subscriptions: Vec<Subscription>,
    next_id: u64,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for one kind of event.
    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&Event) -> Result<(), HandlerError> + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription {
            id,
            kind,
            handler: Box::new(handler),
        });
        id
    }

    /// Removes a handler. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscriptions.iter().filter(|s| s.kind == kind).count()
    }

    /// Delivers an event to every handler subscribed to its kind.
    pub fn emit(&mut self, event: &Event) -> EmitReport {
        let kind = event.kind();
        let mut report = EmitReport::default();

        for subscription in self.subscriptions.iter_mut().filter(|s| s.kind == kind) {
            match invoke(|| (subscription.handler)(event)) {
                Ok(()) => report.delivered += 1,
                Err(reason) => {
                    report.failed += 1;
                    tracing::warn!(
                        event = %kind,
                        subscription = subscription.id.0,
                        error = %reason,
                        "Event handler failed"
                    );
                }
            }
        }
        report
    }
}

/// Runs a handler, turning a panic into an error.
pub(crate) fn invoke<F>(f: F) -> Result<(), HandlerError>
where
    F: FnOnce() -> Result<(), HandlerError>,
{
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(HandlerError::new(format!(
            "handler panicked: {}",
            panic_message(payload.as_ref())
        ))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
