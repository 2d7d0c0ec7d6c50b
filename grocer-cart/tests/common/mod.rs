//! Shared test helpers for cart tests.

#![allow(dead_code)]

use grocer_cart::backend::mock::MockBackend;
use grocer_cart::{BroadcastNotifier, CartConfig, CartState};
use grocer_types::{CartLine, ItemDetails, ItemId};
use std::sync::Arc;
use std::time::Duration;

/// Item details with the given stock limit.
pub fn details(stock_limit: u32) -> ItemDetails {
    ItemDetails::new(stock_limit, "Test item", 2.0)
}

/// A line as a server snapshot would carry it.
pub fn snapshot_line(id: u64, quantity: u32, stock_limit: u32) -> CartLine {
    CartLine::new(
        ItemId::new(id),
        quantity,
        ItemDetails::new(stock_limit, format!("Item {id}"), 1.5),
    )
}

/// A cart over a fresh mock backend, with a subscribable notifier.
pub fn make_cart(config: CartConfig) -> (CartState, Arc<MockBackend>, BroadcastNotifier) {
    let backend = Arc::new(MockBackend::new());
    let notifier = BroadcastNotifier::new(16);
    let cart = CartState::with_notifier(backend.clone(), config, Arc::new(notifier.clone()));
    (cart, backend, notifier)
}

/// Sleeps on tokio's clock. Under a paused clock this advances time and
/// lets every ready task run first.
pub async fn advance_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
