//! Cart configuration.

use crate::reconcile::ResyncPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the cart state and the bag session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartConfig {
    /// Debounce for edits that leave a positive quantity (ms).
    pub debounce_ms: u64,
    /// Debounce for removals (ms). Zero means the next tick.
    pub removal_debounce_ms: u64,
    /// How a server snapshot treats items with edits still outstanding.
    pub resync_policy: ResyncPolicy,
    /// Delay before the bag is re-fetched after a removal (ms).
    pub removal_refresh_ms: u64,
    /// Extra wait when the removed item is still pending at that point (ms).
    pub removal_refresh_extension_ms: u64,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 2_000,
            removal_debounce_ms: 0,
            resync_policy: ResyncPolicy::Replace,
            removal_refresh_ms: 1_000,
            removal_refresh_extension_ms: 1_000,
        }
    }
}

impl CartConfig {
    /// Debounce applied to an edit that sets `quantity`.
    pub fn delay_for(&self, quantity: u32) -> Duration {
        if quantity == 0 {
            Duration::from_millis(self.removal_debounce_ms)
        } else {
            Duration::from_millis(self.debounce_ms)
        }
    }

    pub(crate) fn removal_refresh(&self) -> Duration {
        Duration::from_millis(self.removal_refresh_ms)
    }

    pub(crate) fn removal_refresh_extension(&self) -> Duration {
        Duration::from_millis(self.removal_refresh_extension_ms)
    }
}
