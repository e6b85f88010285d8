//! Input events for canvas interaction.

use serde::{Deserialize, Serialize};

use crate::drop_target::DropOffer;
use crate::transform::{Point, Vector};

/// Phase of a continuous gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GesturePhase {
    /// Gesture recognised (fingers down and moving).
    Began,
    /// Gesture value updated.
    Changed,
    /// Gesture finished; its value should be committed.
    Ended,
    /// Gesture aborted by the system; its value should be discarded.
    Cancelled,
}

/// Recognised gestures on the canvas.
///
/// Coordinates are in view space. Continuous gestures carry the cumulative
/// value since the gesture began, not the delta from the previous event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "gesture", content = "data", rename_all = "snake_case")]
#[allow(missing_docs)] // Enum variant fields documented at variant level
pub enum Gesture {
    /// Single tap at a point (x, y coordinates).
    Tap { x: f64, y: f64 },

    /// Double tap at a point (x, y coordinates).
    DoubleTap { x: f64, y: f64 },

    /// One-finger drag with its cumulative translation in view pixels.
    Drag {
        phase: GesturePhase,
        translation_x: f64,
        translation_y: f64,
    },

    /// Pinch with its cumulative scale factor (1.0 = no change).
    Pinch { phase: GesturePhase, scale: f64 },
}

impl Gesture {
    /// Tap at a view point.
    #[must_use]
    pub const fn tap(at: Point) -> Self {
        Self::Tap { x: at.x, y: at.y }
    }

    /// Double tap at a view point.
    #[must_use]
    pub const fn double_tap(at: Point) -> Self {
        Self::DoubleTap { x: at.x, y: at.y }
    }

    /// Drag update with a cumulative translation.
    #[must_use]
    pub const fn drag(phase: GesturePhase, translation: Vector) -> Self {
        Self::Drag {
            phase,
            translation_x: translation.dx,
            translation_y: translation.dy,
        }
    }

    /// Pinch update with a cumulative scale.
    #[must_use]
    pub const fn pinch(phase: GesturePhase, scale: f64) -> Self {
        Self::Pinch { phase, scale }
    }

    /// Phase of a continuous gesture; `None` for discrete taps.
    #[must_use]
    pub const fn phase(&self) -> Option<GesturePhase> {
        match self {
            Self::Drag { phase, .. } | Self::Pinch { phase, .. } => Some(*phase),
            Self::Tap { .. } | Self::DoubleTap { .. } => None,
        }
    }
}

/// All input events an editing session can receive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum InputEvent {
    /// Recognised gesture.
    Gesture(Gesture),

    /// Drag-and-drop or paste at a view point.
    Drop {
        /// X coordinate.
        x: f64,
        /// Y coordinate.
        y: f64,
        /// Representations offered by the drop source.
        offers: Vec<DropOffer>,
    },

    /// Delete every selected item.
    DeleteSelection,

    /// Undo the last document change.
    Undo,

    /// Redo the last undone change.
    Redo,

    /// The canvas viewport changed size.
    Resize {
        /// New width in pixels.
        width: f64,
        /// New height in pixels.
        height: f64,
    },
}
