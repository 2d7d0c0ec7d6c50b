//! Optimistic cart store.
//!
//! The in-memory cart the UI renders. It changes synchronously on every
//! intent, never waiting on the network, and never holds a zero-quantity line.

use grocer_types::{CartLine, ItemDetails, ItemId};
use std::collections::{BTreeMap, HashMap};

/// Cart lines keyed by item, plus the last details seen for every item.
#[derive(Debug, Clone, Default)]
pub struct CartStore {
    lines: BTreeMap<ItemId, CartLine>,
    /// Survives line removal so a rollback can recreate the line.
    known_details: HashMap<ItemId, ItemDetails>,
}

impl CartStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Displayed quantity, 0 when the item is not in the cart.
    pub fn quantity(&self, item_id: ItemId) -> u32 {
        self.lines.get(&item_id).map_or(0, |l| l.quantity)
    }

    /// Returns the line for an item.
    pub fn line(&self, item_id: ItemId) -> Option<&CartLine> {
        self.lines.get(&item_id)
    }

    /// All lines in item id order.
    pub fn lines(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.values()
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns true if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sets a line's quantity with fresh details; zero removes the line.
    pub fn apply(&mut self, item_id: ItemId, quantity: u32, details: ItemDetails) {
        self.known_details.insert(item_id, details.clone());
        if quantity == 0 {
            self.lines.remove(&item_id);
        } else {
            self.lines
                .insert(item_id, CartLine::new(item_id, quantity, details));
        }
    }

    /// Puts a line back to `quantity` using the last known details.
    ///
    /// Returns false if the line would be non-empty but no details were
    /// ever seen for the item; the line is then left absent.
    pub fn restore(&mut self, item_id: ItemId, quantity: u32) -> bool {
        if quantity == 0 {
            self.lines.remove(&item_id);
            return true;
        }
        if let Some(line) = self.lines.get_mut(&item_id) {
            line.quantity = quantity;
            return true;
        }
        match self.known_details.get(&item_id) {
            Some(details) => {
                self.lines
                    .insert(item_id, CartLine::new(item_id, quantity, details.clone()));
                true
            }
            None => false,
        }
    }

    /// Remembers details without touching the cart lines.
    pub fn remember_details(&mut self, item_id: ItemId, details: ItemDetails) {
        self.known_details.insert(item_id, details);
    }

    /// Replaces every line. Zero-quantity lines are dropped.
    pub fn replace_all(&mut self, lines: impl IntoIterator<Item = CartLine>) {
        self.lines.clear();
        for line in lines {
            self.known_details
                .insert(line.item_id, line.details.clone());
            if line.quantity > 0 {
                self.lines.insert(line.item_id, line);
            }
        }
    }

    /// Inserts or removes a single line as given, keeping the zero invariant.
    pub(crate) fn put_line(&mut self, line: CartLine) {
        self.known_details
            .insert(line.item_id, line.details.clone());
        if line.quantity == 0 {
            self.lines.remove(&line.item_id);
        } else {
            self.lines.insert(line.item_id, line);
        }
    }

    /// Sum of all line totals.
    pub fn subtotal(&self) -> f64 {
        self.lines.values().map(CartLine::line_total).sum()
    }
}
