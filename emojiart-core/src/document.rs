//! The document model and its mutation intents.

use std::collections::HashSet;

use url::Url;

use crate::item::{clamp_item_size, ItemId, PlacedItem};
use crate::transform::{Point, Vector};
use crate::{CoreError, CoreResult};

/// What is drawn behind the placed items.
///
/// Switching variants is a full replace. Equality compares the whole value,
/// payload included, so re-setting an equal URL is not a change.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Background {
    /// Nothing; the canvas is plain white.
    #[default]
    Blank,
    /// An image to be fetched from a remote URL.
    Url(Url),
    /// Encoded image bytes stored inline in the document.
    ImageData(Vec<u8>),
}

impl Background {
    /// The URL, if this is a remote background.
    #[must_use]
    pub fn url(&self) -> Option<&Url> {
        match self {
            Self::Url(url) => Some(url),
            _ => None,
        }
    }

    /// The inline bytes, if this is an inline background.
    #[must_use]
    pub fn image_data(&self) -> Option<&[u8]> {
        match self {
            Self::ImageData(data) => Some(data),
            _ => None,
        }
    }

    /// Whether this is the blank background.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Blank)
    }
}

/// A mutation request against a [`Document`].
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Replace the background.
    SetBackground(Background),
    /// Place a new emoji.
    AddItem {
        /// Emoji text.
        text: String,
        /// Document-space position.
        at: (i32, i32),
        /// Requested size, clamped into the item size range.
        size: i32,
    },
    /// Move an item by a document-space displacement.
    MoveItem {
        /// Target item.
        id: ItemId,
        /// Displacement in document units.
        by: Vector,
    },
    /// Multiply an item's size by a factor.
    ScaleItem {
        /// Target item.
        id: ItemId,
        /// Scale factor.
        by: f64,
    },
    /// Remove an item.
    DeleteItem {
        /// Target item.
        id: ItemId,
    },
}

impl Intent {
    /// Human-readable action name, used for undo menus.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::SetBackground(_) => "Set Background".to_string(),
            Self::AddItem { text, .. } => format!("Add {text}"),
            Self::MoveItem { .. } => "Move".to_string(),
            Self::ScaleItem { .. } => "Scale".to_string(),
            Self::DeleteItem { .. } => "Delete".to_string(),
        }
    }
}

/// Result of applying an [`Intent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentOutcome {
    /// The document changed.
    Changed,
    /// A new item was added with this id.
    Added(ItemId),
    /// Nothing changed: the value was already current, or the target item
    /// does not exist.
    Unchanged,
}

impl IntentOutcome {
    /// Whether the document was modified.
    #[must_use]
    pub const fn is_change(self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// A background plus an ordered list of placed items.
///
/// Item order is paint order: the last item draws on top.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    background: Background,
    items: Vec<PlacedItem>,
    /// Last id handed out. Never decremented.
    last_id: u64,
}

impl Document {
    /// Create an empty document with a blank background.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a document from persisted parts.
    ///
    /// The id counter resumes from the larger of `last_id` and the highest
    /// item id present.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MalformedDocument`] if two items share an id or
    /// the id counter is already exhausted.
    pub fn from_parts(
        background: Background,
        items: Vec<PlacedItem>,
        last_id: u64,
    ) -> CoreResult<Self> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(item.id()) {
                return Err(CoreError::MalformedDocument(format!(
                    "duplicate item id {}",
                    item.id()
                )));
            }
        }
        let highest = items.iter().map(|i| i.id().get()).max().unwrap_or(0);
        let last_id = last_id.max(highest);
        if last_id == u64::MAX {
            return Err(CoreError::MalformedDocument(
                "item id counter is exhausted".into(),
            ));
        }
        Ok(Self {
            background,
            items,
            last_id,
        })
    }

    /// The current background.
    #[must_use]
    pub fn background(&self) -> &Background {
        &self.background
    }

    /// All items in paint order.
    #[must_use]
    pub fn items(&self) -> &[PlacedItem] {
        &self.items
    }

    /// Look up an item by id.
    #[must_use]
    pub fn item(&self, id: ItemId) -> Option<&PlacedItem> {
        self.items.iter().find(|i| i.id() == id)
    }

    /// Whether an item with this id exists.
    #[must_use]
    pub fn contains(&self, id: ItemId) -> bool {
        self.item(id).is_some()
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the document has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The last id handed out by this document.
    #[must_use]
    pub const fn last_id(&self) -> u64 {
        self.last_id
    }

    /// Topmost item containing a document-space point.
    #[must_use]
    pub fn item_at(&self, p: Point) -> Option<ItemId> {
        self.items
            .iter()
            .rev()
            .find(|i| i.contains_point(p))
            .map(PlacedItem::id)
    }

    /// Replace the background. Returns whether the value changed.
    pub fn set_background(&mut self, background: Background) -> bool {
        if self.background == background {
            return false;
        }
        self.background = background;
        true
    }

    /// Place a new item and return its id.
    pub fn add_item(&mut self, text: impl Into<String>, at: (i32, i32), size: i32) -> ItemId {
        self.last_id += 1;
        let id = ItemId::from_raw(self.last_id);
        self.items
            .push(PlacedItem::new(id, text.into(), at.0, at.1, size));
        id
    }

    /// Move an item. The displacement is rounded to whole document units.
    ///
    /// Returns `false` if the item does not exist or the rounded
    /// displacement is zero.
    pub fn move_item(&mut self, id: ItemId, by: Vector) -> bool {
        let Some(item) = self.items.iter_mut().find(|i| i.id() == id) else {
            tracing::debug!("move ignored, no item {id}");
            return false;
        };
        let (dx, dy) = (round_to_i32(by.dx), round_to_i32(by.dy));
        if dx == 0 && dy == 0 {
            return false;
        }
        item.x = item.x.saturating_add(dx);
        item.y = item.y.saturating_add(dy);
        true
    }

    /// Scale an item's size by `factor`, clamped into the item size range.
    ///
    /// Returns `false` if the item does not exist, the factor is NaN, or the
    /// resulting size equals the current one.
    pub fn scale_item(&mut self, id: ItemId, factor: f64) -> bool {
        let Some(item) = self.items.iter_mut().find(|i| i.id() == id) else {
            tracing::debug!("scale ignored, no item {id}");
            return false;
        };
        let Some(size) = clamp_item_size(f64::from(item.size) * factor) else {
            return false;
        };
        if size == item.size {
            return false;
        }
        item.size = size;
        true
    }

    /// Remove an item, returning it if it existed.
    pub fn delete_item(&mut self, id: ItemId) -> Option<PlacedItem> {
        let index = self.items.iter().position(|i| i.id() == id)?;
        Some(self.items.remove(index))
    }

    /// Apply an intent.
    pub fn apply(&mut self, intent: &Intent) -> IntentOutcome {
        let changed = match intent {
            Intent::SetBackground(background) => self.set_background(background.clone()),
            Intent::AddItem { text, at, size } => {
                return IntentOutcome::Added(self.add_item(text.clone(), *at, *size));
            }
            Intent::MoveItem { id, by } => self.move_item(*id, *by),
            Intent::ScaleItem { id, by } => self.scale_item(*id, *by),
            Intent::DeleteItem { id } => self.delete_item(*id).is_some(),
        };
        if changed {
            IntentOutcome::Changed
        } else {
            IntentOutcome::Unchanged
        }
    }

    /// Restore background and items from a snapshot. The id counter keeps
    /// the larger of the two values so ids stay unique.
    pub(crate) fn restore_from(&mut self, snapshot: &Self) {
        self.background = snapshot.background.clone();
        self.items = snapshot.items.clone();
        self.last_id = self.last_id.max(snapshot.last_id);
    }

    /// Serialize the document to its persisted JSON form.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> CoreResult<String> {
        crate::schema::DocumentRecord::from(self).to_json()
    }

    /// Parse a document from its persisted JSON form.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not valid JSON or violates the
    /// document format.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        crate::schema::DocumentRecord::from_json(json)?.into_document()
    }
}

#[allow(clippy::cast_possible_truncation)] // float-to-int `as` saturates
pub(crate) fn round_to_i32(value: f64) -> i32 {
    if value.is_finite() {
        value.round() as i32
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{MAX_ITEM_SIZE, MIN_ITEM_SIZE};

    fn url(s: &str) -> Url {
        Url::parse(s).expect("valid url")
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut doc = Document::new();
        let ghost = doc.add_item("👻", (0, 0), 80);
        let pumpkin = doc.add_item("🎃", (0, 0), 40);
        assert_eq!(ghost.get(), 1);
        assert_eq!(pumpkin.get(), 2);

        doc.delete_item(ghost).expect("should delete");
        let clown = doc.add_item("🤡", (0, 0), 30);
        assert_eq!(clown.get(), 3);
    }

    #[test]
    fn test_set_background_detects_equal_values() {
        let mut doc = Document::new();
        assert!(!doc.set_background(Background::Blank));
        assert!(doc.set_background(Background::Url(url("https://a.example/x.png"))));
        assert!(!doc.set_background(Background::Url(url("https://a.example/x.png"))));
        assert!(doc.set_background(Background::Url(url("https://b.example/x.png"))));
        assert!(doc.set_background(Background::ImageData(vec![1, 2, 3])));
        assert!(!doc.set_background(Background::ImageData(vec![1, 2, 3])));
        assert!(doc.set_background(Background::ImageData(vec![1, 2, 4])));
    }

    #[test]
    fn test_move_item_rounds_displacement() {
        let mut doc = Document::new();
        let id = doc.add_item("🚗", (10, 10), 40);
        assert!(doc.move_item(id, Vector::new(2.5, -2.4)));
        let item = doc.item(id).expect("exists");
        assert_eq!((item.x, item.y), (13, 8));

        assert!(!doc.move_item(id, Vector::new(0.2, -0.3)));
    }

    #[test]
    fn test_mutations_on_missing_item_are_noops() {
        let mut doc = Document::new();
        let id = doc.add_item("🚗", (0, 0), 40);
        let before = doc.clone();
        let missing = ItemId::from_raw(99);

        assert!(!doc.move_item(missing, Vector::new(5.0, 5.0)));
        assert!(!doc.scale_item(missing, 2.0));
        assert!(doc.delete_item(missing).is_none());
        assert_eq!(doc, before);
        assert!(doc.contains(id));
    }

    #[test]
    fn test_scale_item_clamps_and_rounds() {
        let mut doc = Document::new();
        let id = doc.add_item("🐶", (0, 0), 41);

        assert!(doc.scale_item(id, 1.5));
        assert_eq!(doc.item(id).map(|i| i.size), Some(62)); // 61.5 rounds up

        assert!(doc.scale_item(id, 1000.0));
        assert_eq!(doc.item(id).map(|i| i.size), Some(MAX_ITEM_SIZE));

        assert!(doc.scale_item(id, 0.0001));
        assert_eq!(doc.item(id).map(|i| i.size), Some(MIN_ITEM_SIZE));

        assert!(!doc.scale_item(id, f64::NAN));
        assert_eq!(doc.item(id).map(|i| i.size), Some(MIN_ITEM_SIZE));
    }

    #[test]
    fn test_item_at_prefers_topmost() {
        let mut doc = Document::new();
        let below = doc.add_item("🐱", (0, 0), 40);
        let above = doc.add_item("🦁", (10, 0), 40);
        assert_eq!(doc.item_at(Point::new(5.0, 0.0)), Some(above));
        assert_eq!(doc.item_at(Point::new(-15.0, 0.0)), Some(below));
        assert_eq!(doc.item_at(Point::new(200.0, 0.0)), None);
    }

    #[test]
    fn test_apply_reports_outcomes() {
        let mut doc = Document::new();
        let outcome = doc.apply(&Intent::AddItem {
            text: "🐼".into(),
            at: (1, 2),
            size: 40,
        });
        let IntentOutcome::Added(id) = outcome else {
            panic!("expected Added, got {outcome:?}");
        };
        assert_eq!(
            doc.apply(&Intent::MoveItem {
                id,
                by: Vector::new(3.0, 3.0)
            }),
            IntentOutcome::Changed
        );
        assert_eq!(
            doc.apply(&Intent::DeleteItem { id }),
            IntentOutcome::Changed
        );
        assert_eq!(
            doc.apply(&Intent::DeleteItem { id }),
            IntentOutcome::Unchanged
        );
    }

    #[test]
    fn test_from_parts_rejects_duplicate_ids() {
        let items = vec![
            PlacedItem::new(ItemId::from_raw(1), "🐻".into(), 0, 0, 40),
            PlacedItem::new(ItemId::from_raw(1), "🐨".into(), 0, 0, 40),
        ];
        let result = Document::from_parts(Background::Blank, items, 1);
        assert!(matches!(result, Err(CoreError::MalformedDocument(_))));
    }

    #[test]
    fn test_from_parts_resumes_counter_past_highest_id() {
        let items = vec![PlacedItem::new(ItemId::from_raw(7), "🐻".into(), 0, 0, 40)];
        let mut doc = Document::from_parts(Background::Blank, items, 2).expect("valid");
        assert_eq!(doc.add_item("🐨", (0, 0), 40).get(), 8);
    }

    #[test]
    fn test_from_parts_rejects_exhausted_counter() {
        let items = vec![PlacedItem::new(ItemId::from_raw(u64::MAX), "🐻".into(), 0, 0, 40)];
        let result = Document::from_parts(Background::Blank, items, 0);
        assert!(matches!(result, Err(CoreError::MalformedDocument(_))));

        let result = Document::from_parts(Background::Blank, Vec::new(), u64::MAX);
        assert!(matches!(result, Err(CoreError::MalformedDocument(_))));

        let mut doc =
            Document::from_parts(Background::Blank, Vec::new(), u64::MAX - 1).expect("valid");
        assert_eq!(doc.add_item("🐨", (0, 0), 40).get(), u64::MAX);
    }

    #[test]
    fn test_restore_keeps_counter_monotonic() {
        let mut doc = Document::new();
        let snapshot = doc.clone();
        doc.add_item("🐯", (0, 0), 40);
        doc.restore_from(&snapshot);
        assert!(doc.is_empty());
        assert_eq!(doc.add_item("🐯", (0, 0), 40).get(), 2);
    }
}
