//! # EmojiArt Runtime
//!
//! Async plumbing around [`emojiart_core::EditorSession`]:
//!
//! - [`Editor`] spawns background image fetches on Tokio and feeds their
//!   results back through the session's staleness check.
//! - [`HttpImageLoader`] fetches remote images with `reqwest`.
//! - [`decode_background`] turns encoded bytes into RGBA pixels.
//! - [`Autosave`] writes document changes to a library after a quiet period.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod autosave;
pub mod decode;
pub mod editor;
pub mod error;
pub mod loader;

pub use autosave::Autosave;
pub use decode::{decode_background, decode_background_blocking};
pub use editor::{Editor, FetchCompletion};
pub use error::{FetchError, FetchResult, RuntimeError, RuntimeResult};
pub use loader::{load_background, HttpImageLoader, ImageLoader};
