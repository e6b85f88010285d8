//! Image decoding for backgrounds.

use emojiart_core::BackgroundImage;

use crate::error::{FetchError, FetchResult};

/// Name of the encoded format, from its leading bytes.
fn format_name(data: &[u8]) -> &'static str {
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        "png"
    } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "jpeg"
    } else if data.starts_with(b"GIF8") {
        "gif"
    } else if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
        "webp"
    } else if data.starts_with(b"BM") {
        "bmp"
    } else {
        "unknown"
    }
}

/// Decode encoded image bytes into RGBA pixels.
///
/// # Errors
///
/// Returns [`FetchError::Empty`] for empty input and [`FetchError::Decode`]
/// if the bytes are not a supported image.
pub fn decode_background(data: &[u8]) -> FetchResult<BackgroundImage> {
    if data.is_empty() {
        return Err(FetchError::Empty);
    }
    let img = image::load_from_memory(data)?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    tracing::debug!(
        format = format_name(data),
        width,
        height,
        bytes = data.len(),
        "decoded background image"
    );
    Ok(BackgroundImage {
        width,
        height,
        rgba: rgba.into_raw().into(),
    })
}

/// Decode on the blocking thread pool.
///
/// # Errors
///
/// As [`decode_background`], plus [`FetchError::Task`] if the blocking task
/// fails.
pub async fn decode_background_blocking(data: Vec<u8>) -> FetchResult<BackgroundImage> {
    tokio::task::spawn_blocking(move || decode_background(&data)).await?
}
