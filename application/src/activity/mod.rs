//! Activity delivery: bounded queue, per-source emitters and the pump task.

pub mod queue;

pub use queue::{ActivityPump, ActivityQueue, EventEmitter};
