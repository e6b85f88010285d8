//! Background image fetch bookkeeping.
//!
//! The fetch itself runs elsewhere; this module decides when one is needed
//! and whether its result may still be applied. Every background change
//! bumps a generation counter and hands out a [`FetchTicket`]. A completion
//! is accepted only if its ticket is from the current generation and the
//! document still shows the background the ticket was issued for.

use std::fmt;
use std::sync::Arc;

use url::Url;

use crate::document::Background;
use crate::transform::Size;

/// Where a background image comes from, for status display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Remote image.
    Remote(Url),
    /// Inline bytes stored in the document.
    Inline {
        /// Number of encoded bytes.
        byte_len: usize,
    },
}

impl ImageSource {
    /// The source of a background, `None` for blank.
    #[must_use]
    pub fn of(background: &Background) -> Option<Self> {
        match background {
            Background::Blank => None,
            Background::Url(url) => Some(Self::Remote(url.clone())),
            Background::ImageData(data) => Some(Self::Inline {
                byte_len: data.len(),
            }),
        }
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(url) => write!(f, "{url}"),
            Self::Inline { byte_len } => write!(f, "inline image ({byte_len} bytes)"),
        }
    }
}

/// Progress of the current background fetch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FetchStatus {
    /// Nothing to fetch, or the last fetch succeeded.
    #[default]
    Idle,
    /// A fetch is in flight.
    Fetching,
    /// The last fetch produced no image.
    Failed(ImageSource),
}

impl FetchStatus {
    /// Whether a fetch is in flight.
    #[must_use]
    pub const fn is_fetching(&self) -> bool {
        matches!(self, Self::Fetching)
    }
}

/// A decoded background image.
#[derive(Clone, PartialEq, Eq)]
pub struct BackgroundImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA8 pixel data, row-major.
    pub rgba: Arc<[u8]>,
}

impl BackgroundImage {
    /// Natural size of the image.
    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }
}

impl fmt::Debug for BackgroundImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackgroundImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

/// Authorisation to deliver one fetch result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    background: Background,
}

impl FetchTicket {
    /// Generation this ticket belongs to.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Background to fetch.
    #[must_use]
    pub fn background(&self) -> &Background {
        &self.background
    }
}

/// Tracks the current fetch generation, status and decoded image.
#[derive(Debug, Clone, Default)]
pub struct FetchTracker {
    generation: u64,
    status: FetchStatus,
    image: Option<BackgroundImage>,
}

impl FetchTracker {
    /// Create an idle tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current fetch status.
    #[must_use]
    pub fn status(&self) -> &FetchStatus {
        &self.status
    }

    /// Currently displayed background image.
    #[must_use]
    pub fn image(&self) -> Option<&BackgroundImage> {
        self.image.as_ref()
    }

    /// Current generation.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Start tracking a new background.
    ///
    /// Any earlier ticket becomes stale and the displayed image is cleared.
    /// Returns `None` for a blank background, which needs no fetch.
    pub fn begin(&mut self, background: &Background) -> Option<FetchTicket> {
        self.generation += 1;
        self.image = None;
        if background.is_blank() {
            self.status = FetchStatus::Idle;
            return None;
        }
        self.status = FetchStatus::Fetching;
        Some(FetchTicket {
            generation: self.generation,
            background: background.clone(),
        })
    }

    /// Deliver the result of a fetch.
    ///
    /// `current` is the document's background at delivery time. Returns
    /// `false` and changes nothing if the ticket is stale.
    pub fn complete(
        &mut self,
        ticket: &FetchTicket,
        current: &Background,
        image: Option<BackgroundImage>,
    ) -> bool {
        if ticket.generation != self.generation || ticket.background != *current {
            tracing::debug!(
                ticket = ticket.generation,
                current = self.generation,
                "discarding stale background fetch"
            );
            return false;
        }
        match image {
            Some(image) => {
                tracing::debug!(width = image.width, height = image.height, "background image ready");
                self.image = Some(image);
                self.status = FetchStatus::Idle;
            }
            None => {
                self.image = None;
                self.status = ImageSource::of(current)
                    .map_or(FetchStatus::Idle, FetchStatus::Failed);
                if let FetchStatus::Failed(source) = &self.status {
                    tracing::warn!(%source, "background fetch failed");
                }
            }
        }
        true
    }
}
