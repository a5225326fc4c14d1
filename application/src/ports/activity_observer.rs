//! Activity observer port
//!
//! Receives [`ActivityEvent`]s for live progress display or transcripts.
//! Observers are called from a single pump task, never from agent tasks,
//! so a slow observer cannot stall an agent.

use finteam_domain::ActivityEvent;
use std::sync::Arc;

/// Sink for activity events
pub trait ActivityObserver: Send + Sync {
    fn notify(&self, event: &ActivityEvent);
}

/// No-op observer
pub struct NoActivity;

impl ActivityObserver for NoActivity {
    fn notify(&self, _event: &ActivityEvent) {}
}

/// Observer that forwards every event to several observers, in order.
pub struct CompositeObserver {
    delegates: Vec<Arc<dyn ActivityObserver>>,
}

impl CompositeObserver {
    pub fn new(delegates: Vec<Arc<dyn ActivityObserver>>) -> Self {
        Self { delegates }
    }

    pub fn push(&mut self, observer: Arc<dyn ActivityObserver>) {
        self.delegates.push(observer);
    }

    pub fn is_empty(&self) -> bool {
        self.delegates.is_empty()
    }
}

impl ActivityObserver for CompositeObserver {
    fn notify(&self, event: &ActivityEvent) {
        for d in &self.delegates {
            d.notify(event);
        }
    }
}
