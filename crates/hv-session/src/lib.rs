//! Update coordinator for HealthViz.
//!
//! A [`Session`] is the single owned context of an interactive run. UI glue
//! mutates its filter specification at high frequency and calls
//! [`Session::apply_filters`] when it wants results. Each apply publishes
//! one complete [`Publication`] through the typed [`EventBus`] and queues it
//! for render consumers, which the [`RenderScheduler`] serves at coalesced
//! tick boundaries.
//!
//! # Module Organization
//!
//! - `session`: the context object
//! - `event`: named events and the subscriber registry
//! - `schedule`: coalescing policies and the two-tier render scheduler
//! - `config`: TOML-loadable cache and delay settings

mod config;
mod error;
mod event;
mod publication;
mod schedule;
mod session;

pub use config::{DEFAULT_SECONDARY_DELAY_MS, SessionConfig};
pub use error::{HandlerError, Result, SessionError};
pub use event::{EmitReport, Event, EventBus, EventKind, SubscriptionId};
pub use publication::Publication;
pub use schedule::{Coalesce, ConsumerClass, ConsumerId, Deferred, RenderReport, RenderScheduler};
pub use session::{Session, SessionCacheStats};
