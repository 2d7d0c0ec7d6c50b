//! Per-item mutation state.

use crate::scheduler::CancelToken;
use grocer_types::ItemId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Where an item's outstanding edit stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingState {
    /// Nothing outstanding.
    #[default]
    Idle,
    /// Timer armed, no request sent yet.
    Debouncing,
    /// Request sent, awaiting the response.
    InFlight,
    /// The last request failed and the line was rolled back.
    Error,
}

impl PendingState {
    /// Returns true while an edit has not reached the server's answer yet.
    pub fn is_active(self) -> bool {
        matches!(self, PendingState::Debouncing | PendingState::InFlight)
    }
}

/// Tracking record for one item with something outstanding.
#[derive(Debug, Default)]
pub(crate) struct PendingEntry {
    pub(crate) state: PendingState,
    /// Generation of the armed timer; a timer firing with another value is
    /// stale.
    pub(crate) generation: u64,
    pub(crate) timer: Option<CancelToken>,
    /// An edit arrived while a request was in flight.
    pub(crate) queued: bool,
}

impl PendingEntry {
    /// Cancels the armed timer, if any.
    pub(crate) fn cancel_timer(&mut self) {
        if let Some(token) = self.timer.take() {
            token.cancel();
        }
    }
}

/// Pending entries for all items. Idle items have no entry.
#[derive(Debug, Default)]
pub(crate) struct PendingTable {
    entries: HashMap<ItemId, PendingEntry>,
    /// Table-wide, so generations stay unique across dropped entries.
    generation: u64,
}

impl PendingTable {
    /// Hands out a generation no timer has carried before.
    pub(crate) fn next_generation(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }

    pub(crate) fn state(&self, item_id: ItemId) -> PendingState {
        self.entries
            .get(&item_id)
            .map_or(PendingState::Idle, |e| e.state)
    }

    pub(crate) fn is_queued(&self, item_id: ItemId) -> bool {
        self.entries.get(&item_id).is_some_and(|e| e.queued)
    }

    pub(crate) fn get_mut(&mut self, item_id: ItemId) -> Option<&mut PendingEntry> {
        self.entries.get_mut(&item_id)
    }

    pub(crate) fn entry(&mut self, item_id: ItemId) -> &mut PendingEntry {
        self.entries.entry(item_id).or_default()
    }

    /// Drops the entry, cancelling its timer.
    pub(crate) fn clear(&mut self, item_id: ItemId) {
        if let Some(mut entry) = self.entries.remove(&item_id) {
            entry.cancel_timer();
        }
    }

    /// Items whose edit is still debouncing or in flight.
    pub(crate) fn active_items(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.entries
            .iter()
            .filter(|(_, e)| e.state.is_active())
            .map(|(id, _)| *id)
    }
}
