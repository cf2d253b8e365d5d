//! Explicit scheduling policies for render delivery.
//!
//! Time is always passed in as an [`Instant`](std::time::Instant), never
//! read from the clock, so supersession can be tested deterministically.

mod deferred;
mod policy;
mod render;

pub use deferred::Deferred;
pub use policy::Coalesce;
pub use render::{ConsumerClass, ConsumerId, RenderReport, RenderScheduler};
