//! # EmojiArt Core
//!
//! Document model and interaction logic for composing emoji scenes over a
//! background image.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               EditorSession                 │
//! ├─────────────────────────────────────────────┤
//! │  Gesture Reconciler  │  Document Model      │
//! │  - Tap / double tap  │  - Background        │
//! │  - Pan / zoom        │  - Placed items      │
//! │  - Move / scale sel. │  - Mutation intents  │
//! ├─────────────────────────────────────────────┤
//! │  Selection │ View Transform │ Undo │ Fetch  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Gestures arrive as [`InputEvent`]s. The reconciler branches on whether
//! anything is selected, converts view-space deltas to document units and
//! emits [`Intent`]s, which the session applies as undoable actions.
//! Background changes queue an image fetch that the async runtime performs.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod document;
pub mod drop_target;
pub mod emoji;
pub mod error;
pub mod event;
pub mod fetch;
pub mod gesture;
pub mod item;
pub mod library;
pub mod palette;
pub mod schema;
pub mod selection;
pub mod session;
pub mod transform;
pub mod undo;

pub use config::EditorConfig;
pub use document::{Background, Document, Intent, IntentOutcome};
pub use drop_target::{resolve_drop, DropAction, DropOffer};
pub use error::{CoreError, CoreResult};
pub use event::{Gesture, GesturePhase, InputEvent};
pub use fetch::{BackgroundImage, FetchStatus, FetchTicket, FetchTracker, ImageSource};
pub use gesture::{GestureOutcome, GestureReconciler, GestureState};
pub use item::{ItemId, PlacedItem, MAX_ITEM_SIZE, MIN_ITEM_SIZE};
pub use library::DocumentLibrary;
pub use palette::{Palette, PaletteStore};
pub use selection::Selection;
pub use session::{ChangeEvent, EditorSession, SubscriptionId};
pub use transform::{Point, Size, Vector, ViewTransform};
pub use undo::UndoStack;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
