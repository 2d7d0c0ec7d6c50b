//! Core type definitions for the grocer storefront client.
//!
//! This crate defines the plain data shared by the cart core and the
//! development backend:
//! - Item identifiers (packaging/SKU ids)
//! - Cart lines and the caller-supplied item details they carry
//! - HTTP wire records for the bag endpoints, validated at the boundary
//!
//! Nothing in here holds state or talks to the network.

mod cart;
mod ids;
pub mod wire;

pub use cart::{CartLine, ItemDetails};
pub use ids::ItemId;
pub use wire::{BagLine, BagSnapshot, Delivery};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while turning wire records into typed values.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid item id: {0}")]
    InvalidItemId(String),

    #[error("invalid field `{field}` for item {item_id}: {reason}")]
    InvalidField {
        item_id: u64,
        field: &'static str,
        reason: String,
    },

    #[error("item {0} appears more than once in the bag")]
    DuplicateItem(ItemId),
}
