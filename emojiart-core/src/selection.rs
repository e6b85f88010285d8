//! The set of currently selected items.

use std::collections::HashSet;

use crate::document::Document;
use crate::item::ItemId;

/// Selected item ids. Not persisted.
///
/// The owning session keeps every id here present in its document; deleting
/// an item removes it from the selection in the same operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: HashSet<ItemId>,
}

impl Selection {
    /// Create an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `id`. Returns whether it is now selected.
    pub fn toggle(&mut self, id: ItemId) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    /// Add `id` to the selection.
    pub fn insert(&mut self, id: ItemId) -> bool {
        self.ids.insert(id)
    }

    /// Whether `id` is selected.
    #[must_use]
    pub fn contains(&self, id: ItemId) -> bool {
        self.ids.contains(&id)
    }

    /// Deselect everything.
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Remove `id` if present. Returns whether it was selected.
    pub fn remove_if_present(&mut self, id: ItemId) -> bool {
        self.ids.remove(&id)
    }

    /// Drop ids that no longer exist in `document`. Returns how many were
    /// removed.
    pub fn retain_existing(&mut self, document: &Document) -> usize {
        let before = self.ids.len();
        self.ids.retain(|id| document.contains(*id));
        before - self.ids.len()
    }

    /// Whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Number of selected items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Iterate selected ids in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.ids.iter().copied()
    }

    /// Selected ids in ascending order.
    #[must_use]
    pub fn sorted(&self) -> Vec<ItemId> {
        let mut ids: Vec<_> = self.ids.iter().copied().collect();
        ids.sort_unstable();
        ids
    }
}
