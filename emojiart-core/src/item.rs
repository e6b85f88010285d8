//! Placed items - emoji positioned on the canvas.

use serde::{Deserialize, Serialize};

use crate::transform::Point;

/// Smallest size an item may have.
pub const MIN_ITEM_SIZE: i32 = 10;

/// Largest size an item may have.
pub const MAX_ITEM_SIZE: i32 = 600;

/// Identifier of a placed item.
///
/// Ids are assigned from a per-document counter that only ever increases,
/// so an id is never handed out twice, even after its item is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(u64);

impl ItemId {
    /// Wrap a raw id value.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw id value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An emoji placed on the canvas.
///
/// Position is in document space. The id is fixed at creation; everything
/// else may be edited through document intents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedItem {
    id: ItemId,
    /// The emoji text.
    pub text: String,
    /// Horizontal document position.
    pub x: i32,
    /// Vertical document position.
    pub y: i32,
    /// Glyph size, within [`MIN_ITEM_SIZE`, `MAX_ITEM_SIZE`].
    pub size: i32,
}

impl PlacedItem {
    pub(crate) fn new(id: ItemId, text: String, x: i32, y: i32, size: i32) -> Self {
        Self {
            id,
            text,
            x,
            y,
            size: size.clamp(MIN_ITEM_SIZE, MAX_ITEM_SIZE),
        }
    }

    /// The item's identifier.
    #[must_use]
    pub const fn id(&self) -> ItemId {
        self.id
    }

    /// Document-space position of the item's centre.
    #[must_use]
    pub fn position(&self) -> Point {
        Point::new(f64::from(self.x), f64::from(self.y))
    }

    /// Check if a document-space point falls within the item.
    ///
    /// An item occupies a `size` x `size` square centred on its position.
    #[must_use]
    pub fn contains_point(&self, p: Point) -> bool {
        let half = f64::from(self.size) / 2.0;
        let c = self.position();
        (p.x - c.x).abs() <= half && (p.y - c.y).abs() <= half
    }
}

/// Clamp a computed size into the allowed item range and round it to the
/// nearest integer, ties away from zero.
///
/// Returns `None` for NaN.
#[must_use]
pub fn clamp_item_size(size: f64) -> Option<i32> {
    if size.is_nan() {
        return None;
    }
    let clamped = size.clamp(f64::from(MIN_ITEM_SIZE), f64::from(MAX_ITEM_SIZE));
    // Clamped into [10, 600], the cast cannot truncate.
    #[allow(clippy::cast_possible_truncation)]
    Some(clamped.round() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps_size() {
        let small = PlacedItem::new(ItemId(1), "👻".into(), 0, 0, 2);
        assert_eq!(small.size, MIN_ITEM_SIZE);
        let large = PlacedItem::new(ItemId(2), "👻".into(), 0, 0, 9000);
        assert_eq!(large.size, MAX_ITEM_SIZE);
    }

    #[test]
    fn test_contains_point() {
        let item = PlacedItem::new(ItemId(1), "🎃".into(), 100, -50, 40);
        assert!(item.contains_point(Point::new(100.0, -50.0)));
        assert!(item.contains_point(Point::new(120.0, -30.0)));
        assert!(!item.contains_point(Point::new(121.0, -50.0)));
        assert!(!item.contains_point(Point::new(100.0, -71.0)));
    }

    #[test]
    fn test_clamp_item_size_rounds_half_away_from_zero() {
        assert_eq!(clamp_item_size(40.5), Some(41));
        assert_eq!(clamp_item_size(40.49), Some(40));
        assert_eq!(clamp_item_size(0.0), Some(MIN_ITEM_SIZE));
        assert_eq!(clamp_item_size(f64::INFINITY), Some(MAX_ITEM_SIZE));
        assert_eq!(clamp_item_size(f64::NEG_INFINITY), Some(MIN_ITEM_SIZE));
        assert_eq!(clamp_item_size(f64::NAN), None);
    }

    #[test]
    fn test_item_id_display() {
        assert_eq!(ItemId::from_raw(42).to_string(), "42");
    }
}
