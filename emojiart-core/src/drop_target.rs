//! Drop and paste handling.
//!
//! A drop source may offer several representations of the same payload. At
//! most one of them is used, in this order:
//!
//! 1. a URL, which becomes a remote background,
//! 2. non-empty image bytes, which become an inline background,
//! 3. text whose first character is an emoji, which is placed as an item.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::document::Background;
use crate::emoji;

/// One representation offered by a drop or paste source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DropOffer {
    /// A URL string.
    Url(String),
    /// Encoded image bytes (base64 on the wire).
    ImageBytes(#[serde(with = "crate::schema::base64_bytes")] Vec<u8>),
    /// Plain text.
    Text(String),
}

/// What a drop resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropAction {
    /// Replace the document background.
    SetBackground(Background),
    /// Place this emoji at the drop location.
    AddEmoji {
        /// The emoji character.
        text: String,
    },
}

/// Pick the single action a set of offers resolves to.
///
/// Returns `None` when nothing usable was offered, including text that does
/// not start with an emoji.
#[must_use]
pub fn resolve_drop(offers: &[DropOffer]) -> Option<DropAction> {
    let url = offers.iter().find_map(|offer| match offer {
        DropOffer::Url(raw) => Url::parse(raw).ok(),
        _ => None,
    });
    if let Some(url) = url {
        return Some(DropAction::SetBackground(Background::Url(image_url(url))));
    }

    let bytes = offers.iter().find_map(|offer| match offer {
        DropOffer::ImageBytes(bytes) if !bytes.is_empty() => Some(bytes),
        _ => None,
    });
    if let Some(bytes) = bytes {
        return Some(DropAction::SetBackground(Background::ImageData(bytes.clone())));
    }

    let text = offers.iter().find_map(|offer| match offer {
        DropOffer::Text(text) => Some(text),
        _ => None,
    })?;
    match emoji::first_character(text) {
        Some(character) if emoji::is_emoji(character) => Some(DropAction::AddEmoji {
            text: character.to_string(),
        }),
        _ => {
            tracing::debug!("dropped text does not start with an emoji");
            None
        }
    }
}

/// Unwrap an image link embedded in a search-result URL.
///
/// Image search results link to a landing page carrying the actual image
/// location in an `imgurl` query parameter. When present and valid, that
/// URL is returned; otherwise `url` is returned unchanged.
#[must_use]
pub fn image_url(url: Url) -> Url {
    let embedded = url
        .query_pairs()
        .find(|(key, _)| key == "imgurl")
        .and_then(|(_, value)| Url::parse(&value).ok());
    embedded.unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_wins_over_text() {
        let action = resolve_drop(&[
            DropOffer::Text("😀".into()),
            DropOffer::Url("https://example.com/cat.jpg".into()),
        ]);
        assert_eq!(
            action,
            Some(DropAction::SetBackground(Background::Url(
                Url::parse("https://example.com/cat.jpg").expect("url")
            )))
        );
    }

    #[test]
    fn test_image_bytes_used_without_url() {
        let action = resolve_drop(&[
            DropOffer::Text("😀".into()),
            DropOffer::ImageBytes(vec![0x89, b'P', b'N', b'G']),
        ]);
        assert_eq!(
            action,
            Some(DropAction::SetBackground(Background::ImageData(vec![
                0x89, b'P', b'N', b'G'
            ])))
        );
    }

    #[test]
    fn test_unparsable_url_falls_through() {
        let action = resolve_drop(&[
            DropOffer::Url("not a url".into()),
            DropOffer::ImageBytes(Vec::new()),
            DropOffer::Text("🦊 fox".into()),
        ]);
        assert_eq!(action, Some(DropAction::AddEmoji { text: "🦊".into() }));
    }

    #[test]
    fn test_text_must_start_with_emoji() {
        assert_eq!(resolve_drop(&[DropOffer::Text("fox 🦊".into())]), None);
        assert_eq!(resolve_drop(&[DropOffer::Text(String::new())]), None);
        assert_eq!(resolve_drop(&[]), None);
    }

    #[test]
    fn test_image_url_unwraps_imgurl() {
        let url = Url::parse(
            "https://images.example.com/imgres?imgurl=https%3A%2F%2Fcdn.example.org%2Fdog.png&w=100",
        )
        .expect("url");
        assert_eq!(image_url(url).as_str(), "https://cdn.example.org/dog.png");
    }

    #[test]
    fn test_image_url_keeps_plain_links() {
        let url = Url::parse("https://cdn.example.org/dog.png?size=large").expect("url");
        assert_eq!(image_url(url.clone()), url);
    }

    #[test]
    fn test_offer_wire_format() {
        let json = serde_json::to_value(DropOffer::ImageBytes(vec![1, 2, 3])).expect("json");
        assert_eq!(json["kind"], "image_bytes");
        assert_eq!(json["value"], "AQID");
    }
}
