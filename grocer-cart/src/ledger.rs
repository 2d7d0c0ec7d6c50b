//! Confirmed-quantity ledger.
//!
//! Holds the rollback baseline for items with an edit outstanding. An entry
//! is written before the first optimistic edit of a burst and consumed when
//! that edit's outcome is applied.

use grocer_types::ItemId;
use std::collections::HashMap;

/// Last server-acknowledged quantity per item.
#[derive(Debug, Clone, Default)]
pub struct ConfirmedLedger {
    entries: HashMap<ItemId, u32>,
}

impl ConfirmedLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the baseline for an item, if one is recorded.
    pub fn get(&self, item_id: ItemId) -> Option<u32> {
        self.entries.get(&item_id).copied()
    }

    /// Records `current` as the baseline unless one already exists.
    /// Returns true if a new entry was written.
    pub fn snapshot_if_absent(&mut self, item_id: ItemId, current: u32) -> bool {
        match self.entries.entry(item_id) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(current);
                true
            }
        }
    }

    /// Records a quantity the server just accepted.
    pub fn confirm(&mut self, item_id: ItemId, quantity: u32) {
        self.entries.insert(item_id, quantity);
    }

    /// Removes and returns the baseline for an item.
    pub fn take(&mut self, item_id: ItemId) -> Option<u32> {
        self.entries.remove(&item_id)
    }

    /// Drops every entry and installs `entries` as the new baselines.
    pub fn replace_all(&mut self, entries: impl IntoIterator<Item = (ItemId, u32)>) {
        self.entries = entries.into_iter().collect();
    }

    /// Number of recorded baselines.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no baselines are recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
