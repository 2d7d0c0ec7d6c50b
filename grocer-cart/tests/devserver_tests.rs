//! End-to-end runs of the cart over HTTP against the in-memory dev backend.

use grocer_cart::{
    BagSession, BroadcastNotifier, CartConfig, CartNotice, CartState, HttpBagClient,
    HttpClientConfig,
};
use grocer_devserver::{build_router, DevBag};
use grocer_types::{ItemDetails, ItemId};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

async fn spawn_dev_backend(bag: Arc<DevBag>) -> String {
    let app = build_router(bag);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://127.0.0.1:{}", port)
}

fn fast_config() -> CartConfig {
    CartConfig {
        debounce_ms: 50,
        removal_refresh_ms: 100,
        removal_refresh_extension_ms: 100,
        ..CartConfig::default()
    }
}

async fn make_session(bag: Arc<DevBag>) -> (BagSession, BroadcastNotifier) {
    let base_url = spawn_dev_backend(bag).await;
    let client = HttpBagClient::new(HttpClientConfig {
        base_url,
        timeout_secs: 5,
        auth_token: None,
    })
    .unwrap();
    let backend = Arc::new(client);
    let notifier = BroadcastNotifier::new(8);
    let cart = CartState::with_notifier(backend.clone(), fast_config(), Arc::new(notifier.clone()));
    (BagSession::new(cart, backend), notifier)
}

/// Polls until `item_id` has nothing outstanding, or panics after 5 s.
async fn settle(cart: &CartState, item_id: ItemId) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        tokio::time::sleep(Duration::from_millis(20)).await;
        if !cart.is_pending(item_id) && !cart.is_loading(item_id) {
            return;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "item {item_id} did not settle"
        );
    }
}

#[tokio::test]
async fn refresh_loads_seeded_bag() {
    let (session, _) = make_session(Arc::new(DevBag::seeded())).await;

    let report = session.refresh().await.unwrap();

    assert_eq!(report.lines, 3);
    assert_eq!(session.cart().get_quantity(ItemId::new(42)), 2);
    assert_eq!(session.cart().get_quantity(ItemId::new(9)), 3);
    assert!(session.is_out_of_stock(ItemId::new(7)));
}

#[tokio::test]
async fn accepted_edit_reaches_the_server() {
    let bag = Arc::new(DevBag::seeded());
    let (session, notices) = make_session(bag.clone()).await;
    let mut rx = notices.subscribe();
    session.refresh().await.unwrap();
    let milk = ItemId::new(42);
    let details = ItemDetails::new(10, "Whole milk 1L", 1.19);

    session.set_quantity(milk, 3, details.clone());
    session.set_quantity(milk, 4, details);
    settle(session.cart(), milk).await;

    assert_eq!(bag.quantity(milk), Some(4));
    assert_eq!(session.cart().get_quantity(milk), 4);
    assert!(!session.cart().has_error(milk));
    assert_eq!(session.cart().confirmed_quantity(milk), None);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn stock_conflict_rolls_back_new_line() {
    let bag = Arc::new(DevBag::seeded());
    let (session, notices) = make_session(bag.clone()).await;
    let mut rx = notices.subscribe();
    session.refresh().await.unwrap();
    let oil = ItemId::new(23);

    // The client believes there are 10; the server only has 5.
    session.set_quantity(oil, 6, ItemDetails::new(10, "Olive oil 500ml", 7.9));
    assert_eq!(session.cart().get_quantity(oil), 6);
    settle(session.cart(), oil).await;

    assert_eq!(session.cart().get_quantity(oil), 0);
    assert!(session.cart().line(oil).is_none());
    assert!(session.cart().has_error(oil));
    assert_eq!(bag.quantity(oil), Some(0));

    let notice = rx.recv().await.unwrap();
    assert_eq!(
        notice,
        CartNotice::MutationFailed {
            item_id: oil,
            reason: "rejected by server (409): only 5 left in stock".into(),
            reverted_to: 0,
        }
    );
}

#[tokio::test]
async fn out_of_stock_increase_reverts_to_confirmed_quantity() {
    let bag = Arc::new(DevBag::seeded());
    let (session, _) = make_session(bag.clone()).await;
    session.refresh().await.unwrap();
    let coffee = ItemId::new(7);

    session.set_quantity(coffee, 2, ItemDetails::new(2, "Ground coffee 250g", 6.49));
    settle(session.cart(), coffee).await;

    assert_eq!(session.cart().get_quantity(coffee), 1);
    assert!(session.cart().has_error(coffee));
    assert_eq!(bag.quantity(coffee), Some(1));
}

#[tokio::test]
async fn removal_is_sent_and_followed_by_refresh() {
    let bag = Arc::new(DevBag::seeded());
    let (session, _) = make_session(bag.clone()).await;
    session.refresh().await.unwrap();
    let bread = ItemId::new(9);

    session.set_quantity(bread, 0, ItemDetails::new(12, "Sourdough loaf", 3.8));
    assert_eq!(session.cart().get_quantity(bread), 0);
    settle(session.cart(), bread).await;
    assert_eq!(bag.quantity(bread), Some(0));

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while session.refresh_count() < 2 {
        assert!(tokio::time::Instant::now() < deadline, "no refresh after removal");
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(session.cart().item_count(), 2);
}
