//! Bounded activity queue between agents and the observer.
//!
//! ```text
//! Agent task ──emit──┐
//! Agent task ──emit──┼──▶ ActivityQueue ──pop──▶ pump task ──notify──▶ ActivityObserver
//! Coordinator ─emit──┘
//! ```
//!
//! When the queue is full the oldest Thought/Action event is shed. Result
//! and Failure events are never shed: if nothing droppable is queued the
//! producer waits for the pump to make room, for at most the queue's
//! overflow wait, and then enqueues past capacity.

use crate::ports::activity_observer::ActivityObserver;
use finteam_domain::{ActivityEvent, AgentId, EventKind};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Default bound on how long a Result/Failure producer waits for space.
pub const DEFAULT_OVERFLOW_WAIT: Duration = Duration::from_millis(50);

struct QueueState {
    events: VecDeque<ActivityEvent>,
    dropped: u64,
    overflowed: u64,
    closed: bool,
}

/// Bounded multi-producer, single-consumer event queue.
pub struct ActivityQueue {
    state: Mutex<QueueState>,
    capacity: usize,
    overflow_wait: Duration,
    items: Notify,
    space: Notify,
}

impl ActivityQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(QueueState {
                events: VecDeque::with_capacity(capacity.max(1)),
                dropped: 0,
                overflowed: 0,
                closed: false,
            }),
            capacity: capacity.max(1),
            overflow_wait: DEFAULT_OVERFLOW_WAIT,
            items: Notify::new(),
            space: Notify::new(),
        }
    }

    /// Bound the wait of a Result/Failure producer on a full queue.
    pub fn with_overflow_wait(mut self, wait: Duration) -> Self {
        self.overflow_wait = wait;
        self
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Enqueue an event, shedding or waiting when full. Never waits
    /// longer than the overflow wait.
    ///
    /// Events pushed after [`close`](Self::close) are discarded.
    pub async fn push(&self, mut event: ActivityEvent) {
        let give_up = tokio::time::Instant::now() + self.overflow_wait;
        loop {
            let notified = self.space.notified();
            match self.try_push(event) {
                Ok(()) => {
                    self.items.notify_one();
                    return;
                }
                Err(back) => event = back,
            }
            if tokio::time::timeout_at(give_up, notified).await.is_err() {
                break;
            }
        }

        let mut state = self.lock();
        if state.closed {
            return;
        }
        state.overflowed += 1;
        debug!(
            "Activity queue full of results, enqueueing {} event past capacity",
            event.kind
        );
        state.events.push_back(event);
        drop(state);
        self.items.notify_one();
    }

    /// Returns the event back when the producer has to wait.
    fn try_push(&self, event: ActivityEvent) -> Result<(), ActivityEvent> {
        let mut state = self.lock();
        if state.closed {
            return Ok(());
        }
        if state.events.len() < self.capacity {
            state.events.push_back(event);
            return Ok(());
        }
        if let Some(pos) = state.events.iter().position(|e| e.kind.is_droppable()) {
            state.events.remove(pos);
            state.dropped += 1;
            state.events.push_back(event);
            return Ok(());
        }
        if event.kind.is_droppable() {
            // Full of undroppable events; the new Thought/Action is the one shed.
            state.dropped += 1;
            return Ok(());
        }
        Err(event)
    }

    /// Dequeue the next event, waiting for one. Returns `None` once the
    /// queue is closed and empty.
    pub async fn pop(&self) -> Option<ActivityEvent> {
        loop {
            let notified = self.items.notified();
            {
                let mut state = self.lock();
                if let Some(event) = state.events.pop_front() {
                    drop(state);
                    self.space.notify_one();
                    return Some(event);
                }
                if state.closed {
                    return None;
                }
            }
            notified.await;
        }
    }

    /// Stop accepting events. Already queued events can still be popped.
    pub fn close(&self) {
        self.lock().closed = true;
        self.items.notify_one();
        self.space.notify_waiters();
    }

    /// Number of Thought/Action events shed so far
    pub fn dropped(&self) -> u64 {
        self.lock().dropped
    }

    /// Number of Result/Failure events enqueued past capacity so far
    pub fn overflowed(&self) -> u64 {
        self.lock().overflowed
    }

    pub fn len(&self) -> usize {
        self.lock().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Per-source event producer assigning sequence numbers from 1.
pub struct EventEmitter {
    source: AgentId,
    queue: Arc<ActivityQueue>,
    next_sequence: u64,
}

impl EventEmitter {
    pub fn new(source: AgentId, queue: Arc<ActivityQueue>) -> Self {
        Self {
            source,
            queue,
            next_sequence: 1,
        }
    }

    pub fn source(&self) -> &AgentId {
        &self.source
    }

    pub async fn emit(&mut self, kind: EventKind, payload: impl Into<String>) {
        let event = ActivityEvent::new(self.source.clone(), kind, payload, self.next_sequence);
        self.next_sequence += 1;
        self.queue.push(event).await;
    }
}

/// The single task delivering queued events to the observer.
pub struct ActivityPump {
    queue: Arc<ActivityQueue>,
    handle: JoinHandle<()>,
}

impl ActivityPump {
    pub fn start(queue: Arc<ActivityQueue>, observer: Arc<dyn ActivityObserver>) -> Self {
        let pump_queue = Arc::clone(&queue);
        let handle = tokio::spawn(async move {
            while let Some(event) = pump_queue.pop().await {
                // Observers may block; keep them off the runtime's workers.
                let observer = Arc::clone(&observer);
                if let Err(e) = tokio::task::spawn_blocking(move || observer.notify(&event)).await {
                    warn!("Activity observer panicked: {}", e);
                }
            }
        });
        Self { queue, handle }
    }

    /// Close the queue and let the pump deliver what is left, for at most
    /// `grace`. Returns the number of events shed during the run.
    pub async fn finish(mut self, grace: Duration) -> u64 {
        self.queue.close();
        if tokio::time::timeout(grace, &mut self.handle).await.is_err() {
            warn!(
                "Activity drain exceeded {:?}, {} events undelivered",
                grace,
                self.queue.len()
            );
            self.handle.abort();
        }
        let dropped = self.queue.dropped();
        if dropped > 0 {
            debug!("Activity queue shed {} thought/action events", dropped);
        }
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(kind: EventKind, sequence: u64) -> ActivityEvent {
        ActivityEvent::new("web".into(), kind, format!("#{}", sequence), sequence)
    }

    #[derive(Default)]
    struct Recording {
        events: Mutex<Vec<ActivityEvent>>,
    }

    impl ActivityObserver for Recording {
        fn notify(&self, event: &ActivityEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    #[tokio::test]
    async fn test_fifo_within_capacity() {
        let queue = ActivityQueue::new(4);
        queue.push(event(EventKind::Thought, 1)).await;
        queue.push(event(EventKind::Result, 2)).await;
        queue.close();

        assert_eq!(queue.pop().await.unwrap().sequence, 1);
        assert_eq!(queue.pop().await.unwrap().sequence, 2);
        assert!(queue.pop().await.is_none());
        assert_eq!(queue.dropped(), 0);
    }

    #[tokio::test]
    async fn test_full_queue_sheds_oldest_droppable() {
        let queue = ActivityQueue::new(3);
        queue.push(event(EventKind::Result, 1)).await;
        queue.push(event(EventKind::Thought, 2)).await;
        queue.push(event(EventKind::Action, 3)).await;
        queue.push(event(EventKind::Result, 4)).await;
        queue.close();

        let mut sequences = Vec::new();
        while let Some(e) = queue.pop().await {
            sequences.push(e.sequence);
        }
        assert_eq!(sequences, vec![1, 3, 4]);
        assert_eq!(queue.dropped(), 1);
    }

    #[tokio::test]
    async fn test_full_of_results_sheds_incoming_thought() {
        let queue = ActivityQueue::new(1);
        queue.push(event(EventKind::Result, 1)).await;
        queue.push(event(EventKind::Thought, 2)).await;
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.dropped(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_result_waits_for_space() {
        let queue = Arc::new(ActivityQueue::new(1).with_overflow_wait(Duration::from_secs(5)));
        queue.push(event(EventKind::Result, 1)).await;

        let producer = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.push(event(EventKind::Failure, 2)).await })
        };
        tokio::task::yield_now().await;
        assert!(!producer.is_finished());

        assert_eq!(queue.pop().await.unwrap().sequence, 1);
        producer.await.unwrap();
        assert_eq!(queue.pop().await.unwrap().sequence, 2);
        assert_eq!(queue.dropped(), 0);
        assert_eq!(queue.overflowed(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_result_overflows_capacity_when_nobody_pops() {
        let queue = ActivityQueue::new(1).with_overflow_wait(Duration::from_millis(50));
        queue.push(event(EventKind::Result, 1)).await;

        let started = tokio::time::Instant::now();
        queue.push(event(EventKind::Failure, 2)).await;
        queue.push(event(EventKind::Result, 3)).await;

        assert!(started.elapsed() <= Duration::from_millis(100));
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.overflowed(), 2);
        assert_eq!(queue.dropped(), 0);

        queue.close();
        let mut sequences = Vec::new();
        while let Some(e) = queue.pop().await {
            sequences.push(e.sequence);
        }
        assert_eq!(sequences, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_emitter_numbers_from_one() {
        let queue = Arc::new(ActivityQueue::new(8));
        let mut emitter = EventEmitter::new("finance".into(), Arc::clone(&queue));
        emitter.emit(EventKind::Thought, "a").await;
        emitter.emit(EventKind::Action, "b").await;
        emitter.emit(EventKind::Result, "c").await;
        queue.close();

        let mut sequences = Vec::new();
        while let Some(e) = queue.pop().await {
            assert_eq!(e.source.as_str(), "finance");
            sequences.push(e.sequence);
        }
        assert_eq!(sequences, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_pump_delivers_everything_on_finish() {
        let queue = Arc::new(ActivityQueue::new(16));
        let recording = Arc::new(Recording::default());
        let pump = ActivityPump::start(Arc::clone(&queue), recording.clone());

        let mut emitter = EventEmitter::new("web".into(), Arc::clone(&queue));
        for _ in 0..10 {
            emitter.emit(EventKind::Thought, "step").await;
        }
        let dropped = pump.finish(Duration::from_secs(1)).await;

        assert_eq!(dropped, 0);
        let events = recording.events.lock().unwrap();
        assert_eq!(events.len(), 10);
        assert!(events.windows(2).all(|w| w[0].sequence < w[1].sequence));
    }

    struct Stalled;

    impl ActivityObserver for Stalled {
        fn notify(&self, _event: &ActivityEvent) {
            std::thread::sleep(Duration::from_millis(400));
        }
    }

    #[tokio::test]
    async fn test_blocking_observer_does_not_hold_producers() {
        let queue = Arc::new(ActivityQueue::new(1).with_overflow_wait(Duration::from_millis(20)));
        let pump = ActivityPump::start(Arc::clone(&queue), Arc::new(Stalled));

        let started = std::time::Instant::now();
        let mut emitter = EventEmitter::new("web".into(), Arc::clone(&queue));
        for _ in 0..4 {
            emitter.emit(EventKind::Result, "done").await;
        }
        let produced = started.elapsed();
        pump.finish(Duration::from_millis(50)).await;

        assert!(produced < Duration::from_millis(300), "producers waited {:?}", produced);
        assert!(started.elapsed() < Duration::from_millis(400));
    }
}
