//! Mutation gateway: sends one request per debounce firing and applies
//! the outcome.
//!
//! At most one request per item is in flight. Edits that arrive meanwhile
//! are collapsed into a single follow-up carrying the latest quantity.

use crate::error::CartResult;
use crate::notify::CartNotice;
use crate::pending::PendingState;
use crate::state::Shared;
use grocer_types::wire::MutateItemRequest;
use grocer_types::ItemId;
use std::sync::Arc;
use tracing::{debug, trace, warn};

impl Shared {
    /// Timer callback: moves the item to in flight and sends its current
    /// quantity.
    pub(crate) fn fire(self: &Arc<Self>, item_id: ItemId, generation: u64) {
        let quantity = {
            let mut guard = self.lock();
            let inner = &mut *guard;
            let Some(entry) = inner.pending.get_mut(item_id) else {
                trace!(%item_id, "Timer fired for idle item");
                return;
            };
            if entry.state != PendingState::Debouncing || entry.generation != generation {
                trace!(%item_id, generation, "Stale timer fired");
                return;
            }
            entry.timer = None;
            entry.state = PendingState::InFlight;
            inner.store.quantity(item_id)
        };
        self.dispatch(item_id, quantity);
    }

    fn dispatch(self: &Arc<Self>, item_id: ItemId, quantity: u32) {
        debug!(%item_id, quantity, "Sending bag mutation");
        let shared = Arc::clone(self);
        self.runtime.spawn(async move {
            let request = MutateItemRequest::new(item_id, quantity);
            let result = shared.backend.mutate_item(&request).await;
            shared.complete(item_id, quantity, result);
        });
    }

    fn complete(self: &Arc<Self>, item_id: ItemId, sent: u32, result: CartResult<()>) {
        let mut guard = self.lock();
        let inner = &mut *guard;

        match result {
            Ok(()) => {
                inner.ledger.confirm(item_id, sent);
                let entry = inner.pending.entry(item_id);
                let queued = std::mem::take(&mut entry.queued);
                let latest = inner.store.quantity(item_id);

                if queued && latest != sent {
                    // Still InFlight; the follow-up goes out right away.
                    drop(guard);
                    debug!(%item_id, sent, latest, "Sending queued quantity");
                    self.dispatch(item_id, latest);
                    return;
                }

                inner.ledger.take(item_id);
                inner.pending.clear(item_id);
                debug!(%item_id, quantity = sent, "Bag mutation confirmed");
            }
            Err(err) => {
                let reverted_to = inner.ledger.take(item_id).unwrap_or(0);
                if !inner.store.restore(item_id, reverted_to) {
                    warn!(%item_id, reverted_to, "No details to restore line, leaving it out");
                }
                let entry = inner.pending.entry(item_id);
                entry.cancel_timer();
                entry.queued = false;
                entry.state = PendingState::Error;
                drop(guard);

                warn!(%item_id, sent, reverted_to, error = %err, "Bag mutation failed, rolled back");
                self.notifier.notify(CartNotice::MutationFailed {
                    item_id,
                    reason: err.to_string(),
                    reverted_to,
                });
            }
        }
    }
}
