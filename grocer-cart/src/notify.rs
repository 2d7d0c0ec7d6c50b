//! User-facing notices emitted by the cart.
//!
//! Successful edits are silent; the optimistic line already shows them.
//! Only failures produce a notice.

use grocer_types::ItemId;
use serde::Serialize;
use std::fmt;
use tokio::sync::broadcast;
use tracing::warn;

/// A one-shot notice for the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CartNotice {
    /// A debounced edit failed and the line was rolled back.
    MutationFailed {
        item_id: ItemId,
        reason: String,
        reverted_to: u32,
    },
}

impl CartNotice {
    /// The item the notice is about.
    pub fn item_id(&self) -> ItemId {
        match self {
            CartNotice::MutationFailed { item_id, .. } => *item_id,
        }
    }
}

impl fmt::Display for CartNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CartNotice::MutationFailed {
                reason,
                reverted_to,
                ..
            } => write!(
                f,
                "Couldn't update your bag: {reason}. Quantity reverted to {reverted_to}."
            ),
        }
    }
}

/// Receives cart notices.
pub trait Notifier: Send + Sync {
    /// Delivers a notice. Must not block.
    fn notify(&self, notice: CartNotice);
}

/// Logs notices and nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: CartNotice) {
        warn!(item_id = %notice.item_id(), "{}", notice);
    }
}

/// Fans notices out to any number of UI subscribers.
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<CartNotice>,
}

impl BroadcastNotifier {
    /// Creates a notifier buffering up to `capacity` notices per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribes to future notices.
    pub fn subscribe(&self) -> broadcast::Receiver<CartNotice> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(32)
    }
}

impl Notifier for BroadcastNotifier {
    fn notify(&self, notice: CartNotice) {
        // No subscribers is fine; the screen may not be mounted.
        let _ = self.sender.send(notice);
    }
}
