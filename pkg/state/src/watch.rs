use chrono::{DateTime, Utc};
use pkg_constants::state::EVENT_CHANNEL_CAPACITY;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::sync::broadcast;

/// What changed in the graph store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StoreEventKind {
    /// Emitted after every committed mutation.
    GraphChanged { nodes: usize, edges: usize },
    /// Emitted only when re-validation produced a different issue list.
    IssuesChanged { errors: usize, warnings: usize },
}

/// A single store event with a monotonic sequence number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreEvent {
    pub seq: u64,
    #[serde(flatten)]
    pub kind: StoreEventKind,
    pub at: DateTime<Utc>,
}

/// In-memory event log that tracks all store mutations with monotonic sequence numbers.
/// Subscribers receive every new event; late joiners can replay recent ones.
#[derive(Clone)]
pub struct EventLog {
    inner: Arc<RwLock<EventLogInner>>,
    sender: broadcast::Sender<StoreEvent>,
}

struct EventLogInner {
    seq: u64,
    /// Ring buffer of recent events (capped)
    events: Vec<StoreEvent>,
    max_events: usize,
}

impl EventLog {
    /// Create a new event log with the given capacity for recent events.
    pub fn new(max_events: usize) -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(RwLock::new(EventLogInner {
                seq: 0,
                events: Vec::with_capacity(max_events),
                max_events,
            })),
            sender,
        }
    }

    /// Record a new event. Called by GraphStore after each commit.
    pub async fn emit(&self, kind: StoreEventKind) -> u64 {
        let mut inner = self.inner.write().await;
        inner.seq += 1;
        let event = StoreEvent {
            seq: inner.seq,
            kind,
            at: Utc::now(),
        };
        // Ring buffer: remove oldest if at capacity
        if inner.events.len() >= inner.max_events {
            inner.events.remove(0);
        }
        inner.events.push(event.clone());
        // Broadcast to subscribers (ignore errors if no receivers)
        let _ = self.sender.send(event);
        inner.seq
    }

    /// Get the current sequence number.
    pub async fn current_seq(&self) -> u64 {
        self.inner.read().await.seq
    }

    /// Get all retained events after the given sequence number.
    pub async fn events_since(&self, from_seq: u64) -> Vec<StoreEvent> {
        let inner = self.inner.read().await;
        inner
            .events
            .iter()
            .filter(|e| e.seq > from_seq)
            .cloned()
            .collect()
    }

    /// Subscribe to receive new events as they are emitted.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.sender.subscribe()
    }
}
