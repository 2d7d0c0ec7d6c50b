//! Cart lines as the client displays them.

use crate::ItemId;
use serde::{Deserialize, Serialize};

/// Denormalized item fields supplied by the caller alongside a quantity.
///
/// They come from the last catalog or bag data the screen saw; the cart
/// never fetches them on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDetails {
    /// Maximum orderable quantity.
    pub stock_limit: u32,
    /// Name shown on the bag screen.
    pub display_name: String,
    /// Price of one unit, in the storefront currency.
    pub unit_price: f64,
}

impl ItemDetails {
    /// Creates item details.
    pub fn new(stock_limit: u32, display_name: impl Into<String>, unit_price: f64) -> Self {
        Self {
            stock_limit,
            display_name: display_name.into(),
            unit_price,
        }
    }
}

/// One line of the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// Unique key across the cart.
    pub item_id: ItemId,
    /// Quantity currently shown to the user.
    pub quantity: u32,
    /// Display fields and stock limit.
    pub details: ItemDetails,
}

impl CartLine {
    /// Creates a cart line.
    pub fn new(item_id: ItemId, quantity: u32, details: ItemDetails) -> Self {
        Self {
            item_id,
            quantity,
            details,
        }
    }

    /// Quantity times unit price.
    pub fn line_total(&self) -> f64 {
        f64::from(self.quantity) * self.details.unit_price
    }
}
