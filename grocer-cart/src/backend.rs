//! Bag backend abstraction.
//!
//! The cart needs exactly two calls from the server: fetch the bag and
//! mutate one item. [`HttpBagClient`](crate::HttpBagClient) implements them
//! over REST; [`mock::MockBackend`] implements them in memory for tests.

use crate::error::CartResult;
use async_trait::async_trait;
use grocer_types::wire::MutateItemRequest;
use grocer_types::BagSnapshot;

/// The server side of the bag.
#[async_trait]
pub trait BagBackend: Send + Sync {
    /// Fetches the authoritative bag.
    async fn fetch_bag(&self) -> CartResult<BagSnapshot>;

    /// Sets one item's quantity. Any error means the change was not applied.
    async fn mutate_item(&self, request: &MutateItemRequest) -> CartResult<()>;
}

/// A mock backend for testing.
pub mod mock {
    use super::*;
    use crate::error::CartError;
    use grocer_types::ItemId;
    use std::collections::{HashSet, VecDeque};
    use std::sync::{Mutex, MutexGuard, PoisonError};
    use std::time::Duration;

    /// Records every request and answers from a script.
    ///
    /// Mutations succeed unless the item was marked failing or a scripted
    /// failure is queued. Each call can be delayed by a fixed latency, which
    /// follows tokio's clock.
    #[derive(Debug, Default)]
    pub struct MockBackend {
        requests: Mutex<Vec<MutateItemRequest>>,
        failing_items: Mutex<HashSet<ItemId>>,
        scripted_failures: Mutex<VecDeque<CartError>>,
        snapshot: Mutex<BagSnapshot>,
        fail_fetch: Mutex<bool>,
        fetch_count: Mutex<usize>,
        latency: Mutex<Duration>,
    }

    fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
        m.lock().unwrap_or_else(PoisonError::into_inner)
    }

    impl MockBackend {
        /// Creates a backend with an empty bag.
        pub fn new() -> Self {
            Self::default()
        }

        /// Sets the snapshot returned by `fetch_bag`.
        pub fn set_snapshot(&self, snapshot: BagSnapshot) {
            *lock(&self.snapshot) = snapshot;
        }

        /// Makes every mutation of `item_id` fail with a 409.
        pub fn fail_item(&self, item_id: ItemId) {
            lock(&self.failing_items).insert(item_id);
        }

        /// Lets mutations of `item_id` succeed again.
        pub fn heal_item(&self, item_id: ItemId) {
            lock(&self.failing_items).remove(&item_id);
        }

        /// Fails the next mutation, whichever item it is for, with `error`.
        pub fn fail_next(&self, error: CartError) {
            lock(&self.scripted_failures).push_back(error);
        }

        /// Makes `fetch_bag` fail.
        pub fn set_fetch_failing(&self, failing: bool) {
            *lock(&self.fail_fetch) = failing;
        }

        /// Delays every call by `latency`.
        pub fn set_latency(&self, latency: Duration) {
            *lock(&self.latency) = latency;
        }

        /// All mutation requests received so far.
        pub fn requests(&self) -> Vec<MutateItemRequest> {
            lock(&self.requests).clone()
        }

        /// Mutation requests for one item.
        pub fn requests_for(&self, item_id: ItemId) -> Vec<MutateItemRequest> {
            lock(&self.requests)
                .iter()
                .filter(|r| r.item_id == item_id)
                .cloned()
                .collect()
        }

        /// Number of `fetch_bag` calls.
        pub fn fetch_count(&self) -> usize {
            *lock(&self.fetch_count)
        }

        async fn wait(&self) {
            let latency = *lock(&self.latency);
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
        }
    }

    #[async_trait]
    impl BagBackend for MockBackend {
        async fn fetch_bag(&self) -> CartResult<BagSnapshot> {
            *lock(&self.fetch_count) += 1;
            self.wait().await;
            if *lock(&self.fail_fetch) {
                return Err(CartError::Network("connection reset".into()));
            }
            Ok(lock(&self.snapshot).clone())
        }

        async fn mutate_item(&self, request: &MutateItemRequest) -> CartResult<()> {
            lock(&self.requests).push(request.clone());
            self.wait().await;
            if let Some(err) = lock(&self.scripted_failures).pop_front() {
                return Err(err);
            }
            if lock(&self.failing_items).contains(&request.item_id) {
                return Err(CartError::Rejected {
                    status: 409,
                    message: "item no longer available".into(),
                });
            }
            Ok(())
        }
    }
}
