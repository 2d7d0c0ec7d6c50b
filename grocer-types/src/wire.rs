//! HTTP wire records for the bag endpoints.
//!
//! The `*Record` types mirror the JSON bodies exactly (camelCase, loosely
//! typed numbers). Nothing enters the typed model until it has passed
//! [`BagSnapshotRecord::validate`].

use crate::{CartLine, Error, ItemDetails, ItemId, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Which delivery list of the bag a line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delivery {
    /// Delivered within the express window.
    Express,
    /// Delivered in a booked slot.
    Scheduled,
}

/// One line of `GET /bag`, as sent by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BagLineRecord {
    pub item_id: u64,
    pub quantity: i64,
    pub stock_limit: i64,
    pub display_name: String,
    pub unit_price: f64,
    #[serde(default)]
    pub out_of_stock: bool,
}

/// Body of `GET /bag`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BagSnapshotRecord {
    #[serde(default)]
    pub express_items: Vec<BagLineRecord>,
    #[serde(default)]
    pub scheduled_items: Vec<BagLineRecord>,
}

/// Body of `POST /bag/items`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutateItemRequest {
    pub item_id: ItemId,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl MutateItemRequest {
    /// Creates a request without a comment.
    pub fn new(item_id: ItemId, quantity: u32) -> Self {
        Self {
            item_id,
            quantity,
            comment: None,
        }
    }

    /// Attaches a shopper comment for the picker.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Response of `POST /bag/items`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutateItemResponse {
    pub success: bool,
}

/// Error body the backend attaches to non-2xx responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
}

/// A validated bag line.
#[derive(Debug, Clone, PartialEq)]
pub struct BagLine {
    pub line: CartLine,
    pub delivery: Delivery,
    pub out_of_stock: bool,
}

/// A validated bag snapshot: the authoritative server cart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BagSnapshot {
    lines: Vec<BagLine>,
}

impl BagSnapshot {
    /// Builds a snapshot from already-typed lines.
    pub fn new(lines: Vec<BagLine>) -> Self {
        Self { lines }
    }

    /// All lines, express first.
    pub fn lines(&self) -> &[BagLine] {
        &self.lines
    }

    /// Lines in the express list.
    pub fn express(&self) -> impl Iterator<Item = &BagLine> {
        self.lines.iter().filter(|l| l.delivery == Delivery::Express)
    }

    /// Lines in the scheduled list.
    pub fn scheduled(&self) -> impl Iterator<Item = &BagLine> {
        self.lines.iter().filter(|l| l.delivery == Delivery::Scheduled)
    }

    /// Ids of lines the server flags as out of stock.
    pub fn out_of_stock(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.lines
            .iter()
            .filter(|l| l.out_of_stock)
            .map(|l| l.line.item_id)
    }

    /// Returns true if the bag has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Consumes the snapshot into plain cart lines.
    pub fn into_cart_lines(self) -> Vec<CartLine> {
        self.lines.into_iter().map(|l| l.line).collect()
    }
}

impl BagSnapshotRecord {
    /// Parses a `GET /bag` body and validates it.
    pub fn from_json(body: &str) -> Result<BagSnapshot> {
        let record: BagSnapshotRecord = serde_json::from_str(body)?;
        record.validate()
    }

    /// Validates every line and converts the record into a [`BagSnapshot`].
    ///
    /// Fails on zero ids, negative or oversized numbers, non-finite or
    /// negative prices, and item ids repeated across the two lists.
    pub fn validate(self) -> Result<BagSnapshot> {
        let mut seen = HashSet::new();
        let mut lines = Vec::with_capacity(self.express_items.len() + self.scheduled_items.len());

        let tagged = self
            .express_items
            .into_iter()
            .map(|r| (r, Delivery::Express))
            .chain(self.scheduled_items.into_iter().map(|r| (r, Delivery::Scheduled)));

        for (record, delivery) in tagged {
            let line = record.validate(delivery)?;
            if !seen.insert(line.line.item_id) {
                return Err(Error::DuplicateItem(line.line.item_id));
            }
            lines.push(line);
        }

        Ok(BagSnapshot { lines })
    }
}

impl BagLineRecord {
    fn validate(self, delivery: Delivery) -> Result<BagLine> {
        let raw_id = self.item_id;
        if raw_id == 0 {
            return Err(Error::InvalidItemId("0".to_string()));
        }
        let quantity = count_field(raw_id, "quantity", self.quantity)?;
        let stock_limit = count_field(raw_id, "stockLimit", self.stock_limit)?;
        if !self.unit_price.is_finite() || self.unit_price < 0.0 {
            return Err(Error::InvalidField {
                item_id: raw_id,
                field: "unitPrice",
                reason: format!("{} is not a valid price", self.unit_price),
            });
        }

        Ok(BagLine {
            line: CartLine::new(
                ItemId::new(raw_id),
                quantity,
                ItemDetails::new(stock_limit, self.display_name, self.unit_price),
            ),
            delivery,
            out_of_stock: self.out_of_stock,
        })
    }
}

fn count_field(item_id: u64, field: &'static str, value: i64) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::InvalidField {
        item_id,
        field,
        reason: format!("{value} is out of range"),
    })
}

impl From<&BagLine> for BagLineRecord {
    fn from(line: &BagLine) -> Self {
        Self {
            item_id: line.line.item_id.get(),
            quantity: i64::from(line.line.quantity),
            stock_limit: i64::from(line.line.details.stock_limit),
            display_name: line.line.details.display_name.clone(),
            unit_price: line.line.details.unit_price,
            out_of_stock: line.out_of_stock,
        }
    }
}

impl From<&BagSnapshot> for BagSnapshotRecord {
    fn from(snapshot: &BagSnapshot) -> Self {
        Self {
            express_items: snapshot.express().map(BagLineRecord::from).collect(),
            scheduled_items: snapshot.scheduled().map(BagLineRecord::from).collect(),
        }
    }
}
