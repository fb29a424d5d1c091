//! Change notification bus for OrgDesk
//!
//! Services publish a [`ChangeEvent`] after every committed write. Listeners
//! (API push channels, caches, tests) subscribe and treat each event as a
//! signal to refetch the affected list; payloads are never diffed.
//!
//! # Example
//!
//! ```rust
//! use orgdesk_events::{ChangeBus, ChangeEvent, ChangeKind, Table};
//!
//! # tokio_test::block_on(async {
//! let bus = ChangeBus::new();
//! let mut subscriber = bus.subscribe();
//!
//! bus.publish(ChangeEvent::new(Table::ToolAccessRequests, ChangeKind::Insert, "req-1"));
//!
//! let event = subscriber.recv().await.unwrap();
//! assert_eq!(event.row_id, "req-1");
//! # });
//! ```

pub mod events;

pub use events::{ChangeEvent, ChangeKind, Table};

use tokio::sync::broadcast;

/// Channel capacity for broadcast events
const CHANNEL_CAPACITY: usize = 1024;

/// Broadcast bus for row-level change events
///
/// Clones share the same underlying channel. A lagging subscriber loses the
/// oldest events, which is harmless since every event only means "refetch".
#[derive(Clone, Debug)]
pub struct ChangeBus {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeBus {
    /// Create a new bus with default capacity (1024 events)
    pub fn new() -> Self {
        Self::with_capacity(CHANNEL_CAPACITY)
    }

    /// Create a new bus with custom capacity
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: ChangeEvent) {
        tracing::trace!(table = %event.table, row_id = %event.row_id, "Publishing change event");
        // No subscribers is fine
        let _ = self.sender.send(event);
    }

    /// Publish several events in order
    pub fn publish_all(&self, events: impl IntoIterator<Item = ChangeEvent>) {
        for event in events {
            self.publish(event);
        }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    /// Number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new()
    }
}
