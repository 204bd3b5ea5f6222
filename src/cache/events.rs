//! Change Events Module
//!
//! Notifications published after each committed mutation of the table.

use serde::Serialize;
use tokio::sync::broadcast;

/// Capacity of the change channel. Slow subscribers observe `Lagged`.
pub const CHANGE_CHANNEL_CAPACITY: usize = 256;

// == Change Kind ==
/// What happened to the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeKind {
    /// A key was inserted or overwritten
    Set,
    /// A key was removed by `delete`
    Deleted,
    /// A key was removed to make room for a new one
    Evicted,
    /// A key was found expired on access and removed
    Expired,
    /// The whole table was emptied
    Cleared,
    /// A sweep removed expired entries
    Swept { removed: usize },
}

// == Cache Change ==
/// A committed mutation. `key` is None for table-wide changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheChange {
    pub key: Option<String>,
    pub kind: ChangeKind,
}

impl CacheChange {
    pub fn keyed(key: impl Into<String>, kind: ChangeKind) -> Self {
        Self {
            key: Some(key.into()),
            kind,
        }
    }

    pub fn table(kind: ChangeKind) -> Self {
        Self { key: None, kind }
    }
}

// == Change Notifier ==
/// Fan-out of change events to any number of subscribers.
#[derive(Debug)]
pub struct ChangeNotifier {
    sender: broadcast::Sender<CacheChange>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CacheChange> {
        self.sender.subscribe()
    }

    /// Publishes a change. Having no subscribers is fine.
    pub fn publish(&self, change: CacheChange) {
        let _ = self.sender.send(change);
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}
