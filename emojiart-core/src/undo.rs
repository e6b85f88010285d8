//! Snapshot-based undo history.

use std::collections::VecDeque;

use crate::document::Document;

/// One undoable action: the document before and after it.
#[derive(Debug, Clone)]
struct UndoEntry {
    description: String,
    before: Document,
    after: Document,
}

/// Bounded undo/redo history of whole-document snapshots.
///
/// Recording a new action clears the redo side. When the history exceeds
/// its depth, the oldest entry is discarded.
#[derive(Debug, Clone)]
pub struct UndoStack {
    undo: VecDeque<UndoEntry>,
    redo: Vec<UndoEntry>,
    max_depth: usize,
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_UNDO_DEPTH)
    }
}

impl UndoStack {
    /// Create a history keeping at most `max_depth` entries.
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            max_depth,
        }
    }

    /// Record an action that turned `before` into `after`.
    pub fn record(&mut self, description: impl Into<String>, before: Document, after: Document) {
        self.redo.clear();
        if self.max_depth == 0 {
            return;
        }
        while self.undo.len() >= self.max_depth {
            self.undo.pop_front();
        }
        self.undo.push_back(UndoEntry {
            description: description.into(),
            before,
            after,
        });
    }

    /// Run `action` against `document` and record it if it reports a change.
    ///
    /// Returns what `action` returned.
    pub fn perform<F>(&mut self, description: &str, document: &mut Document, action: F) -> bool
    where
        F: FnOnce(&mut Document) -> bool,
    {
        let before = document.clone();
        let changed = action(document);
        if changed {
            self.record(description, before, document.clone());
        }
        changed
    }

    /// Revert the most recent action. Returns its description.
    pub fn undo(&mut self, document: &mut Document) -> Option<String> {
        let entry = self.undo.pop_back()?;
        document.restore_from(&entry.before);
        let description = entry.description.clone();
        self.redo.push(entry);
        Some(description)
    }

    /// Re-apply the most recently undone action. Returns its description.
    pub fn redo(&mut self, document: &mut Document) -> Option<String> {
        let entry = self.redo.pop()?;
        document.restore_from(&entry.after);
        let description = entry.description.clone();
        self.undo.push_back(entry);
        Some(description)
    }

    /// Whether there is anything to undo.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Whether there is anything to redo.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Description of the action [`undo`](Self::undo) would revert.
    #[must_use]
    pub fn undo_description(&self) -> Option<&str> {
        self.undo.back().map(|e| e.description.as_str())
    }

    /// Description of the action [`redo`](Self::redo) would re-apply.
    #[must_use]
    pub fn redo_description(&self) -> Option<&str> {
        self.redo.last().map(|e| e.description.as_str())
    }

    /// Number of undoable actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.undo.len()
    }

    /// Whether the history is empty on both sides.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.undo.is_empty() && self.redo.is_empty()
    }

    /// Forget all history.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Vector;

    #[test]
    fn test_undo_redo_round_trip() {
        let mut doc = Document::new();
        let mut history = UndoStack::new(10);

        let mut id = None;
        history.perform("Add 🐙", &mut doc, |d| {
            id = Some(d.add_item("🐙", (0, 0), 40));
            true
        });
        let id = id.expect("added");
        history.perform("Move", &mut doc, |d| d.move_item(id, Vector::new(10.0, 0.0)));

        assert_eq!(history.undo_description(), Some("Move"));
        assert_eq!(history.undo(&mut doc).as_deref(), Some("Move"));
        assert_eq!(doc.item(id).map(|i| i.x), Some(0));

        assert_eq!(history.undo(&mut doc).as_deref(), Some("Add 🐙"));
        assert!(doc.is_empty());
        assert_eq!(history.redo_description(), Some("Add 🐙"));

        history.redo(&mut doc);
        history.redo(&mut doc);
        assert_eq!(doc.item(id).map(|i| i.x), Some(10));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_unchanged_actions_are_not_recorded() {
        let mut doc = Document::new();
        let mut history = UndoStack::new(10);
        history.perform("Move", &mut doc, |_| false);
        assert!(!history.can_undo());
    }

    #[test]
    fn test_record_clears_redo() {
        let mut doc = Document::new();
        let mut history = UndoStack::new(10);
        history.perform("Add 🐢", &mut doc, |d| {
            d.add_item("🐢", (0, 0), 40);
            true
        });
        history.undo(&mut doc);
        assert!(history.can_redo());
        history.perform("Add 🐍", &mut doc, |d| {
            d.add_item("🐍", (0, 0), 40);
            true
        });
        assert!(!history.can_redo());
    }

    #[test]
    fn test_depth_drops_oldest() {
        let mut doc = Document::new();
        let mut history = UndoStack::new(2);
        for text in ["🐢", "🐍", "🦎"] {
            history.perform(&format!("Add {text}"), &mut doc, |d| {
                d.add_item(text, (0, 0), 40);
                true
            });
        }
        assert_eq!(history.len(), 2);
        history.undo(&mut doc);
        history.undo(&mut doc);
        assert!(history.undo(&mut doc).is_none());
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_undo_never_reuses_ids() {
        let mut doc = Document::new();
        let mut history = UndoStack::new(10);
        history.perform("Add 🦖", &mut doc, |d| {
            d.add_item("🦖", (0, 0), 40);
            true
        });
        history.undo(&mut doc);
        assert_eq!(doc.add_item("🦕", (0, 0), 40).get(), 2);
    }
}
