//! Update Applier
//!
//! Applies a pending-update set strictly sequentially, in collection order.
//! Updates may mutate shared on-disk state and must not race, so there is
//! no concurrency here. A failing addon is logged and omitted from the
//! applied set; failure is never fatal to the batch.

use std::sync::Arc;

use crate::registry::Addon;

use super::format_addon_names;

/// Outcome of one apply pass
#[derive(Debug)]
pub struct ApplyReport {
    /// Addons whose update actually changed something, in apply order
    pub applied: Vec<Arc<Addon>>,
    /// Display string of applied addon names, truncated for dialogs
    pub summary: String,
}

impl ApplyReport {
    /// Count line reported to the user: applied out of pending
    pub fn counts(&self, pending_len: usize) -> String {
        format!("{}/{}", self.applied.len(), pending_len)
    }
}

/// Apply every pending update in order.
///
/// Per addon: `Ok(true)` appends to the applied set, `Ok(false)` means the
/// update reported nothing changed, and an error is logged and skipped.
/// The applied set is always a subset of the input.
pub async fn apply_all(pending: &[Arc<Addon>]) -> ApplyReport {
    let mut applied: Vec<Arc<Addon>> = Vec::new();

    for addon in pending {
        match addon.update().await {
            Ok(true) => applied.push(Arc::clone(addon)),
            Ok(false) => {
                log::debug!("addon '{}' already up to date", addon.id());
            }
            Err(e) => {
                log::error!("update of addon '{}' failed: {}", addon.id(), e);
                continue;
            }
        }
    }

    let summary = format_addon_names(applied.iter().map(|a| a.name()));
    ApplyReport { applied, summary }
}
