//! Optimistic bag synchronization for the grocer storefront client.
//!
//! The storefront is a thin client over a REST backend. The one piece with
//! real state is the cart: it shows every edit immediately, sends edits to
//! the server in debounced batches, and rolls back what the server refuses.
//!
//! # Architecture
//!
//! ## Components
//!
//! - **Store**: the lines the UI renders, changed synchronously per intent
//! - **Ledger**: the last server-accepted quantity of items mid-edit, used
//!   as the rollback target
//! - **Scheduler**: per-item debounce timers behind a cancel token
//! - **Gateway**: one request per timer firing, at most one in flight per
//!   item, success/failure applied back to the store and ledger
//! - **Reconcile**: merges a fetched bag snapshot into the cart
//! - **Session**: the cart plus the bag screen's refresh policy
//!
//! ## Edit lifecycle
//!
//! 1. `set_quantity` updates the store and arms the item's timer
//!    (2 s, or the next tick for a removal)
//! 2. Further edits cancel and re-arm the timer
//! 3. The timer fires and the current quantity is sent
//! 4. Success confirms it; failure restores the ledger value, flags the
//!    item, and emits a [`CartNotice`]
//!
//! # Example
//!
//! ```no_run
//! use grocer_cart::{BagSession, CartConfig, CartState, HttpBagClient, HttpClientConfig};
//! use grocer_types::{ItemDetails, ItemId};
//! use std::sync::Arc;
//!
//! # async fn run() -> grocer_cart::CartResult<()> {
//! let backend = Arc::new(HttpBagClient::new(HttpClientConfig::default())?);
//! let cart = CartState::new(backend.clone(), CartConfig::default());
//! let session = BagSession::new(cart, backend);
//!
//! session.refresh().await?;
//! session.set_quantity(ItemId::new(42), 3, ItemDetails::new(10, "Milk 1L", 1.25));
//! assert_eq!(session.cart().get_quantity(ItemId::new(42)), 3);
//! # Ok(())
//! # }
//! ```

pub mod backend;
mod config;
mod error;
mod gateway;
pub mod http;
pub mod ledger;
mod notify;
mod pending;
pub mod reconcile;
pub mod scheduler;
mod session;
mod state;
pub mod store;

pub use backend::BagBackend;
pub use config::CartConfig;
pub use error::{CartError, CartResult};
pub use http::{HttpBagClient, HttpClientConfig};
pub use notify::{BroadcastNotifier, CartNotice, Notifier, TracingNotifier};
pub use pending::PendingState;
pub use reconcile::{ResyncPolicy, ResyncReport};
pub use scheduler::{CancelToken, Scheduler, TimerTask, TokioScheduler};
pub use session::BagSession;
pub use state::{CartState, SetQuantityOutcome};
