//! Cart state: the single owner of the optimistic store, the confirmed
//! ledger and the per-item pending table.
//!
//! All mutation goes through [`CartState::set_quantity`] and
//! [`CartState::sync_from_server_snapshot`]; everything else is a read.
//! Internal locking is never held across an `.await`.

use crate::backend::BagBackend;
use crate::config::CartConfig;
use crate::ledger::ConfirmedLedger;
use crate::notify::{Notifier, TracingNotifier};
use crate::pending::{PendingState, PendingTable};
use crate::reconcile::{self, ResyncPolicy, ResyncReport};
use crate::scheduler::{Scheduler, TokioScheduler};
use crate::store::CartStore;
use grocer_types::{CartLine, ItemDetails, ItemId};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::runtime::Handle;
use tracing::{debug, info};

/// Result of a [`CartState::set_quantity`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetQuantityOutcome {
    /// Applied locally; a debounced mutation is armed.
    Scheduled,
    /// Applied locally; a request for the item is in flight, so the new
    /// quantity goes out as soon as that one resolves.
    QueuedBehindInFlight,
    /// Refused: the quantity is above the item's stock limit. Nothing changed.
    ExceedsStock { requested: u32, limit: u32 },
}

impl SetQuantityOutcome {
    /// Returns true if the cart changed.
    pub fn is_applied(self) -> bool {
        !matches!(self, SetQuantityOutcome::ExceedsStock { .. })
    }
}

pub(crate) struct CartInner {
    pub(crate) store: CartStore,
    pub(crate) ledger: ConfirmedLedger,
    pub(crate) pending: PendingTable,
}

pub(crate) struct Shared {
    pub(crate) inner: Mutex<CartInner>,
    pub(crate) backend: Arc<dyn BagBackend>,
    pub(crate) scheduler: Arc<dyn Scheduler>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) config: CartConfig,
    /// Runtime requests are spawned onto; captured so intents can come from
    /// threads outside it.
    pub(crate) runtime: Handle,
}

impl Shared {
    pub(crate) fn lock(&self) -> MutexGuard<'_, CartInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The optimistic cart. Cheap to clone; clones share state.
///
/// Construct one per app session and hand it to the screens.
#[derive(Clone)]
pub struct CartState {
    shared: Arc<Shared>,
}

impl CartState {
    /// Creates a cart with tokio timers and logged notices, bound to the
    /// current runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime. Use
    /// [`with_components`](Self::with_components) to pass a handle explicitly.
    pub fn new(backend: Arc<dyn BagBackend>, config: CartConfig) -> Self {
        Self::with_notifier(backend, config, Arc::new(TracingNotifier))
    }

    /// Creates a cart with a custom notifier, bound to the current runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn with_notifier(
        backend: Arc<dyn BagBackend>,
        config: CartConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let runtime = Handle::current();
        let scheduler = Arc::new(TokioScheduler::new(runtime.clone()));
        Self::with_components(backend, config, scheduler, notifier, runtime)
    }

    /// Creates a cart from explicit parts. Requests run on `runtime`.
    pub fn with_components(
        backend: Arc<dyn BagBackend>,
        config: CartConfig,
        scheduler: Arc<dyn Scheduler>,
        notifier: Arc<dyn Notifier>,
        runtime: Handle,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(CartInner {
                    store: CartStore::new(),
                    ledger: ConfirmedLedger::new(),
                    pending: PendingTable::default(),
                }),
                backend,
                scheduler,
                notifier,
                config,
                runtime,
            }),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &CartConfig {
        &self.shared.config
    }

    /// The runtime the cart spawns its work onto.
    pub fn runtime(&self) -> &Handle {
        &self.shared.runtime
    }

    // ── Intents ──────────────────────────────────────────────────

    /// Sets an item's quantity optimistically and schedules the mutation.
    ///
    /// The store changes before this returns. Zero removes the line and is
    /// sent on the next tick; any other quantity is debounced so a burst of
    /// taps becomes one request carrying the last value.
    pub fn set_quantity(
        &self,
        item_id: ItemId,
        quantity: u32,
        details: ItemDetails,
    ) -> SetQuantityOutcome {
        if quantity > details.stock_limit {
            debug!(
                %item_id,
                quantity,
                limit = details.stock_limit,
                "Quantity above stock limit, ignoring"
            );
            return SetQuantityOutcome::ExceedsStock {
                requested: quantity,
                limit: details.stock_limit,
            };
        }

        let delay = self.shared.config.delay_for(quantity);
        let mut guard = self.shared.lock();
        let inner = &mut *guard;

        let current = inner.store.quantity(item_id);

        if inner.pending.state(item_id) == PendingState::InFlight {
            inner.ledger.snapshot_if_absent(item_id, current);
            inner.store.apply(item_id, quantity, details);
            inner.pending.entry(item_id).queued = true;
            debug!(%item_id, quantity, "Request in flight, queueing latest quantity");
            return SetQuantityOutcome::QueuedBehindInFlight;
        }

        // The timer is armed before anything visible changes.
        let generation = inner.pending.next_generation();
        let weak: Weak<Shared> = Arc::downgrade(&self.shared);
        let token = self.shared.scheduler.arm(
            delay,
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.fire(item_id, generation);
                }
            }),
        );

        inner.ledger.snapshot_if_absent(item_id, current);
        inner.store.apply(item_id, quantity, details);

        let entry = inner.pending.entry(item_id);
        entry.cancel_timer();
        entry.generation = generation;
        entry.state = PendingState::Debouncing;
        entry.timer = Some(token);

        debug!(%item_id, quantity, delay_ms = delay.as_millis() as u64, "Armed mutation");
        SetQuantityOutcome::Scheduled
    }

    /// Clears the error state of an item. The quantity is left as is.
    pub fn clear_error(&self, item_id: ItemId) {
        let mut inner = self.shared.lock();
        if inner.pending.state(item_id) == PendingState::Error {
            inner.pending.clear(item_id);
        }
    }

    /// Replaces the cart with a server snapshot.
    ///
    /// Under [`ResyncPolicy::Replace`] the snapshot is trusted for every
    /// item. Armed timers and in-flight requests are left running either way.
    pub fn sync_from_server_snapshot(
        &self,
        items: impl IntoIterator<Item = CartLine>,
    ) -> ResyncReport {
        self.sync_with_policy(items, self.shared.config.resync_policy)
    }

    /// Like [`sync_from_server_snapshot`](Self::sync_from_server_snapshot)
    /// with an explicit policy.
    pub fn sync_with_policy(
        &self,
        items: impl IntoIterator<Item = CartLine>,
        policy: ResyncPolicy,
    ) -> ResyncReport {
        let items: Vec<CartLine> = items.into_iter().collect();
        let mut guard = self.shared.lock();
        let inner = &mut *guard;
        let report = reconcile::reconcile(
            &mut inner.store,
            &mut inner.ledger,
            &inner.pending,
            items,
            policy,
        );
        info!(
            lines = report.lines,
            removed = report.removed.len(),
            deferred = report.deferred.len(),
            "Cart resynced from server"
        );
        report
    }

    // ── Queries ──────────────────────────────────────────────────

    /// Displayed quantity, 0 if the item is not in the cart.
    pub fn get_quantity(&self, item_id: ItemId) -> u32 {
        self.shared.lock().store.quantity(item_id)
    }

    /// Returns true while a request for the item is in flight.
    pub fn is_loading(&self, item_id: ItemId) -> bool {
        self.shared.lock().pending.state(item_id) == PendingState::InFlight
    }

    /// Returns true while an edit is waiting to be sent: debouncing, or
    /// queued behind an in-flight request.
    pub fn is_pending(&self, item_id: ItemId) -> bool {
        let inner = self.shared.lock();
        inner.pending.state(item_id) == PendingState::Debouncing || inner.pending.is_queued(item_id)
    }

    /// Returns true if the last request for the item failed.
    pub fn has_error(&self, item_id: ItemId) -> bool {
        self.shared.lock().pending.state(item_id) == PendingState::Error
    }

    /// The item's pending state.
    pub fn pending_state(&self, item_id: ItemId) -> PendingState {
        self.shared.lock().pending.state(item_id)
    }

    /// Rollback baseline for the item, if an edit is outstanding.
    pub fn confirmed_quantity(&self, item_id: ItemId) -> Option<u32> {
        self.shared.lock().ledger.get(item_id)
    }

    /// The item's line.
    pub fn line(&self, item_id: ItemId) -> Option<CartLine> {
        self.shared.lock().store.line(item_id).cloned()
    }

    /// Snapshot of all lines in item id order.
    pub fn lines(&self) -> Vec<CartLine> {
        self.shared.lock().store.lines().cloned().collect()
    }

    /// Number of lines.
    pub fn item_count(&self) -> usize {
        self.shared.lock().store.len()
    }

    /// Sum of line totals.
    pub fn subtotal(&self) -> f64 {
        self.shared.lock().store.subtotal()
    }
}

impl std::fmt::Debug for CartState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.shared.lock();
        f.debug_struct("CartState")
            .field("lines", &inner.store.len())
            .field("baselines", &inner.ledger.len())
            .finish()
    }
}
