//! Event emission boundary.
//!
//! The core's responsibility ends at [`EventEmitter::emit`]: fire and
//! forget, no retries, no ordering guarantees across runs. Transport,
//! serialization to the wire, and retry policy belong to whatever sits
//! behind the trait. Every emitter here is safe to call concurrently from
//! multiple host callback threads.

use crate::run::RunEvent;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Sink for assembled lineage events.
pub trait EventEmitter: Send + Sync {
    /// Hands over one event. Must not block the callback thread
    /// indefinitely and must not panic.
    fn emit(&self, event: RunEvent);
}

/// Buffers events in memory. Intended for tests and embedding.
#[derive(Default)]
pub struct CollectingEmitter {
    events: Mutex<Vec<RunEvent>>,
}

impl CollectingEmitter {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of everything emitted so far.
    pub fn events(&self) -> Vec<RunEvent> {
        self.events.lock().clone()
    }

    /// Drains and returns everything emitted so far.
    pub fn take(&self) -> Vec<RunEvent> {
        std::mem::take(&mut self.events.lock())
    }

    /// Number of emitted events.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether nothing has been emitted.
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventEmitter for CollectingEmitter {
    fn emit(&self, event: RunEvent) {
        self.events.lock().push(event);
    }
}

/// Logs each event as one JSON line.
pub struct TracingEmitter;

impl EventEmitter for TracingEmitter {
    fn emit(&self, event: RunEvent) {
        match serde_json::to_string(&event) {
            Ok(json) => info!(target: "tributary::emit", %json, "lineage event"),
            Err(e) => warn!(run_id = %event.run.run_id, error = %e, "failed to serialize event"),
        }
    }
}

/// Hands events to a bounded channel consumed by a transport task.
///
/// `emit` never blocks: when the buffer is full the event is dropped and
/// counted, because stalling a host callback thread is worse than losing a
/// lineage event.
pub struct ChannelEmitter {
    sender: mpsc::Sender<RunEvent>,
    dropped: AtomicU64,
}

impl ChannelEmitter {
    /// Creates an emitter and the receiving end for the transport task.
    pub fn bounded(capacity: usize) -> (Self, mpsc::Receiver<RunEvent>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (
            Self {
                sender,
                dropped: AtomicU64::new(0),
            },
            receiver,
        )
    }

    /// Number of events dropped because the buffer was full or closed.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl EventEmitter for ChannelEmitter {
    fn emit(&self, event: RunEvent) {
        match self.sender.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(event)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(run_id = %event.run.run_id, "event buffer full, dropping event");
            }
            Err(mpsc::error::TrySendError::Closed(event)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(run_id = %event.run.run_id, "event channel closed, dropping event");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::{Job, Run, RunState};
    use uuid::Uuid;

    fn event() -> RunEvent {
        RunEvent::new(
            RunState::Start,
            Run::new(Uuid::new_v4()),
            Job::new("pipelines", "test_job"),
        )
    }

    #[test]
    fn test_collecting_emitter() {
        let emitter = CollectingEmitter::new();
        assert!(emitter.is_empty());
        emitter.emit(event());
        emitter.emit(event());
        assert_eq!(emitter.len(), 2);
        assert_eq!(emitter.take().len(), 2);
        assert!(emitter.is_empty());
    }

    #[tokio::test]
    async fn test_channel_emitter_delivers() {
        let (emitter, mut receiver) = ChannelEmitter::bounded(4);
        emitter.emit(event());

        let received = receiver.recv().await.unwrap();
        assert_eq!(received.event_type, RunState::Start);
        assert_eq!(emitter.dropped(), 0);
    }

    #[tokio::test]
    async fn test_channel_emitter_drops_on_overflow() {
        let (emitter, _receiver) = ChannelEmitter::bounded(1);
        emitter.emit(event());
        emitter.emit(event());

        assert_eq!(emitter.dropped(), 1);
    }

    #[test]
    fn test_channel_emitter_counts_closed_channel() {
        let (emitter, receiver) = ChannelEmitter::bounded(1);
        drop(receiver);
        emitter.emit(event());
        assert_eq!(emitter.dropped(), 1);
    }
}
