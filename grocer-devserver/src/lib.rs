//! In-memory bag backend for local development of the grocer client.
//!
//! Serves the two bag endpoints the cart talks to, backed by a catalog held
//! in memory. Stock limits and out-of-stock flags are enforced the way the
//! real backend reports them, so rollback paths can be exercised by hand.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use grocer_types::wire::{ApiErrorBody, BagSnapshotRecord, MutateItemRequest, MutateItemResponse};
use grocer_types::{BagLine, BagSnapshot, CartLine, Delivery, ItemDetails, ItemId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, info};

/// One catalog entry and its quantity in the bag.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct BagEntry {
    pub item_id: ItemId,
    #[serde(default)]
    pub quantity: u32,
    #[serde(flatten)]
    pub details: ItemDetails,
    pub delivery: Delivery,
    #[serde(default)]
    pub out_of_stock: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl BagEntry {
    /// Creates an entry that is not in the bag yet.
    pub fn new(item_id: ItemId, details: ItemDetails, delivery: Delivery) -> Self {
        Self {
            item_id,
            quantity: 0,
            details,
            delivery,
            out_of_stock: false,
            comment: None,
        }
    }
}

/// Errors loading a catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid catalog: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("item {0} is listed twice")]
    DuplicateItem(ItemId),
}

/// Mutation refusals, mapped to HTTP statuses.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("item {0} not found")]
    NotFound(ItemId),

    #[error("only {limit} left in stock")]
    ExceedsStock { item_id: ItemId, limit: u32 },

    #[error("item {0} is out of stock")]
    OutOfStock(ItemId),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::ExceedsStock { .. } | ApiError::OutOfStock(_) => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// The in-memory bag.
#[derive(Debug, Default)]
pub struct DevBag {
    entries: Mutex<BTreeMap<ItemId, BagEntry>>,
    latency: Duration,
}

impl DevBag {
    /// Creates a bag over the given catalog.
    pub fn new(entries: impl IntoIterator<Item = BagEntry>) -> Result<Self, CatalogError> {
        let mut map = BTreeMap::new();
        for entry in entries {
            let id = entry.item_id;
            if map.insert(id, entry).is_some() {
                return Err(CatalogError::DuplicateItem(id));
            }
        }
        Ok(Self {
            entries: Mutex::new(map),
            latency: Duration::ZERO,
        })
    }

    /// Loads a catalog from a JSON array of entries.
    pub fn from_json_file(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        let entries: Vec<BagEntry> = serde_json::from_str(&raw)?;
        Self::new(entries)
    }

    /// A small built-in catalog.
    pub fn seeded() -> Self {
        let entry = |id: u64, quantity: u32, stock: u32, name: &str, price: f64, delivery: Delivery| BagEntry {
            quantity,
            ..BagEntry::new(ItemId::new(id), ItemDetails::new(stock, name, price), delivery)
        };
        let mut coffee = entry(7, 1, 2, "Ground coffee 250g", 6.49, Delivery::Scheduled);
        coffee.out_of_stock = true;

        let entries = [
            entry(42, 2, 10, "Whole milk 1L", 1.19, Delivery::Express),
            coffee,
            entry(9, 3, 12, "Sourdough loaf", 3.80, Delivery::Express),
            entry(15, 0, 24, "Free-range eggs x6", 2.65, Delivery::Express),
            entry(23, 0, 5, "Olive oil 500ml", 7.90, Delivery::Scheduled),
        ];
        let map = entries.into_iter().map(|e| (e.item_id, e)).collect();
        Self {
            entries: Mutex::new(map),
            latency: Duration::ZERO,
        }
    }

    /// Delays every response by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<ItemId, BagEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The bag as the client sees it: entries with a positive quantity.
    pub fn snapshot(&self) -> BagSnapshot {
        let entries = self.lock();
        let mut lines: Vec<BagLine> = entries
            .values()
            .filter(|e| e.quantity > 0)
            .map(|e| BagLine {
                line: CartLine::new(e.item_id, e.quantity, e.details.clone()),
                delivery: e.delivery,
                out_of_stock: e.out_of_stock,
            })
            .collect();
        lines.sort_by_key(|l| l.delivery == Delivery::Scheduled);
        BagSnapshot::new(lines)
    }

    /// Current quantity of an item, if it exists.
    pub fn quantity(&self, item_id: ItemId) -> Option<u32> {
        self.lock().get(&item_id).map(|e| e.quantity)
    }

    /// Applies a mutation under the stock rules.
    pub fn apply(&self, request: &MutateItemRequest) -> Result<(), ApiError> {
        let mut entries = self.lock();
        let entry = entries
            .get_mut(&request.item_id)
            .ok_or(ApiError::NotFound(request.item_id))?;

        if request.quantity > entry.quantity && entry.out_of_stock {
            return Err(ApiError::OutOfStock(request.item_id));
        }
        if request.quantity > entry.details.stock_limit {
            return Err(ApiError::ExceedsStock {
                item_id: request.item_id,
                limit: entry.details.stock_limit,
            });
        }

        entry.quantity = request.quantity;
        if request.comment.is_some() {
            entry.comment = request.comment.clone();
        }
        debug!(item_id = %request.item_id, quantity = request.quantity, "Bag item updated");
        Ok(())
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

async fn health_handler() -> &'static str {
    "ok"
}

async fn bag_handler(State(bag): State<Arc<DevBag>>) -> Json<BagSnapshotRecord> {
    bag.simulate_latency().await;
    Json(BagSnapshotRecord::from(&bag.snapshot()))
}

async fn mutate_item_handler(
    State(bag): State<Arc<DevBag>>,
    Json(request): Json<MutateItemRequest>,
) -> Result<Json<MutateItemResponse>, ApiError> {
    bag.simulate_latency().await;
    match bag.apply(&request) {
        Ok(()) => Ok(Json(MutateItemResponse { success: true })),
        Err(e) => {
            info!(item_id = %request.item_id, quantity = request.quantity, "Refused: {}", e);
            Err(e)
        }
    }
}

/// Build the HTTP API router over the given bag.
pub fn build_router(bag: Arc<DevBag>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/bag", get(bag_handler))
        .route("/api/v1/bag/items", post(mutate_item_handler))
        .with_state(bag)
}
