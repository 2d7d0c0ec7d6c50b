//! Bag session: the cart plus the screen-level refresh policy.
//!
//! The bag screen refreshes on focus and on pull-to-refresh, and once more
//! shortly after a removal so server-side effects (stock on other lines,
//! delivery split) show up. That last refresh is a fixed delay, extended
//! once if the removed item is still outstanding. Removals made while one is
//! waiting ride along with it; the wait is never pushed back.

use crate::backend::BagBackend;
use crate::error::CartResult;
use crate::reconcile::ResyncReport;
use crate::state::{CartState, SetQuantityOutcome};
use grocer_types::{ItemDetails, ItemId};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::AbortHandle;
use tracing::{debug, warn};

#[derive(Default)]
struct SessionInner {
    out_of_stock: HashSet<ItemId>,
    refreshes: usize,
    removal_refresh: Option<AbortHandle>,
}

/// A cart bound to its backend. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct BagSession {
    cart: CartState,
    backend: Arc<dyn BagBackend>,
    inner: Arc<Mutex<SessionInner>>,
}

impl BagSession {
    /// Creates a session over an existing cart.
    pub fn new(cart: CartState, backend: Arc<dyn BagBackend>) -> Self {
        Self {
            cart,
            backend,
            inner: Arc::new(Mutex::new(SessionInner::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The cart.
    pub fn cart(&self) -> &CartState {
        &self.cart
    }

    /// Fetches the bag and resyncs the cart from it.
    ///
    /// On a fetch failure the cart is left untouched and the error is
    /// returned for the screen to offer a retry.
    pub async fn refresh(&self) -> CartResult<ResyncReport> {
        let snapshot = match self.backend.fetch_bag().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "Bag fetch failed, keeping local cart");
                return Err(e);
            }
        };

        {
            let mut inner = self.lock();
            inner.out_of_stock = snapshot.out_of_stock().collect();
            inner.refreshes += 1;
        }

        Ok(self.cart.sync_from_server_snapshot(snapshot.into_cart_lines()))
    }

    /// Sets a quantity through the cart; an applied removal also schedules
    /// a delayed refresh.
    pub fn set_quantity(
        &self,
        item_id: ItemId,
        quantity: u32,
        details: ItemDetails,
    ) -> SetQuantityOutcome {
        let outcome = self.cart.set_quantity(item_id, quantity, details);
        if quantity == 0 && outcome.is_applied() {
            self.schedule_removal_refresh(item_id);
        }
        outcome
    }

    fn schedule_removal_refresh(&self, item_id: ItemId) {
        let mut inner = self.lock();
        if inner
            .removal_refresh
            .as_ref()
            .is_some_and(|pending| !pending.is_finished())
        {
            debug!(%item_id, "Refresh after removal already scheduled");
            return;
        }

        let config = self.cart.config();
        let first = config.removal_refresh();
        let extension = config.removal_refresh_extension();
        let session = self.clone();

        let handle = self.cart.runtime().spawn(async move {
            tokio::time::sleep(first).await;
            let cart = session.cart();
            if cart.is_pending(item_id) || cart.is_loading(item_id) {
                debug!(%item_id, "Removal still outstanding, delaying refresh");
                tokio::time::sleep(extension).await;
            }
            // Removals from here on need a fetch of their own.
            session.lock().removal_refresh = None;
            if let Err(e) = session.refresh().await {
                warn!(%item_id, error = %e, "Refresh after removal failed");
            }
        });

        inner.removal_refresh = Some(handle.abort_handle());
    }

    /// Returns true if the last fetched bag flagged the item out of stock.
    pub fn is_out_of_stock(&self, item_id: ItemId) -> bool {
        self.lock().out_of_stock.contains(&item_id)
    }

    /// Number of successful refreshes so far.
    pub fn refresh_count(&self) -> usize {
        self.lock().refreshes
    }
}

impl std::fmt::Debug for BagSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BagSession")
            .field("cart", &self.cart)
            .field("refreshes", &self.lock().refreshes)
            .finish()
    }
}
