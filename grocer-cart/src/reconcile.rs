//! Reconciliation of the optimistic cart with a server snapshot.

use crate::ledger::ConfirmedLedger;
use crate::pending::PendingTable;
use crate::store::CartStore;
use grocer_types::{CartLine, ItemId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How a snapshot treats items whose edit has not been answered yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResyncPolicy {
    /// The snapshot wins for every item, even one mid-edit. A stale snapshot
    /// can therefore bring back a line the user just removed.
    #[default]
    Replace,
    /// Items still debouncing or in flight keep their local line and
    /// baseline; everything else comes from the snapshot.
    DeferPending,
}

/// What a resync did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResyncReport {
    /// Lines in the cart after the resync.
    pub lines: usize,
    /// Items that left the cart.
    pub removed: Vec<ItemId>,
    /// Items kept from local state because an edit was outstanding.
    pub deferred: Vec<ItemId>,
}

/// Applies `items` to the store and ledger under `policy`.
pub(crate) fn reconcile(
    store: &mut CartStore,
    ledger: &mut ConfirmedLedger,
    pending: &PendingTable,
    items: Vec<CartLine>,
    policy: ResyncPolicy,
) -> ResyncReport {
    let before: HashSet<ItemId> = store.lines().map(|l| l.item_id).collect();

    let deferred: Vec<ItemId> = match policy {
        ResyncPolicy::Replace => Vec::new(),
        ResyncPolicy::DeferPending => {
            let mut ids: Vec<ItemId> = pending.active_items().collect();
            ids.sort();
            ids
        }
    };

    if deferred.is_empty() {
        ledger.replace_all(items.iter().map(|l| (l.item_id, l.quantity)));
        store.replace_all(items);
    } else {
        let keep: HashSet<ItemId> = deferred.iter().copied().collect();
        let kept_lines: Vec<CartLine> = deferred
            .iter()
            .filter_map(|id| store.line(*id).cloned())
            .collect();
        let kept_baselines: Vec<(ItemId, u32)> = deferred
            .iter()
            .filter_map(|id| ledger.get(*id).map(|q| (*id, q)))
            .collect();

        let (local, fresh): (Vec<CartLine>, Vec<CartLine>) =
            items.into_iter().partition(|l| keep.contains(&l.item_id));

        ledger.replace_all(
            fresh
                .iter()
                .map(|l| (l.item_id, l.quantity))
                .chain(kept_baselines),
        );
        store.replace_all(fresh);
        // Snapshot details for deferred items are still the freshest we have.
        for line in local {
            store.remember_details(line.item_id, line.details);
        }
        for line in kept_lines {
            store.put_line(line);
        }
    }

    let after: HashSet<ItemId> = store.lines().map(|l| l.item_id).collect();
    let mut removed: Vec<ItemId> = before.difference(&after).copied().collect();
    removed.sort();

    ResyncReport {
        lines: store.len(),
        removed,
        deferred,
    }
}
