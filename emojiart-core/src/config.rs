//! Editor configuration.

use std::time::Duration;

/// Default font size for emoji dropped onto the canvas, in view pixels.
pub const DEFAULT_EMOJI_SIZE: f64 = 40.0;

/// Default number of undo steps retained.
pub const DEFAULT_UNDO_DEPTH: usize = 100;

/// Default quiet period before an autosave is written.
pub const DEFAULT_AUTOSAVE_MS: u64 = 500;

/// Tunables for an editing session.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    /// On-screen size of a newly dropped emoji. Divided by the current zoom
    /// so the emoji appears at this size regardless of zoom.
    pub default_emoji_size: f64,
    /// Maximum undo entries kept; the oldest is dropped first.
    pub undo_depth: usize,
    /// Quiet period after the last document change before autosaving.
    pub autosave_debounce: Duration,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_emoji_size: DEFAULT_EMOJI_SIZE,
            undo_depth: DEFAULT_UNDO_DEPTH,
            autosave_debounce: Duration::from_millis(DEFAULT_AUTOSAVE_MS),
        }
    }
}

impl EditorConfig {
    /// Build a configuration from environment variables or defaults.
    ///
    /// Environment variables:
    /// - `EMOJIART_DEFAULT_EMOJI_SIZE`: emoji size for drops (default: 40)
    /// - `EMOJIART_UNDO_DEPTH`: undo history length (default: 100)
    /// - `EMOJIART_AUTOSAVE_MS`: autosave debounce in milliseconds (default: 500)
    #[must_use]
    pub fn from_env() -> Self {
        let default_emoji_size = std::env::var("EMOJIART_DEFAULT_EMOJI_SIZE")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v > 0.0)
            .unwrap_or(DEFAULT_EMOJI_SIZE);
        let undo_depth = std::env::var("EMOJIART_UNDO_DEPTH")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_UNDO_DEPTH);
        let autosave_ms = std::env::var("EMOJIART_AUTOSAVE_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_AUTOSAVE_MS);
        Self {
            default_emoji_size,
            undo_depth,
            autosave_debounce: Duration::from_millis(autosave_ms),
        }
    }
}
