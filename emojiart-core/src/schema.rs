//! Persisted document format.
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "background": { "kind": "url", "url": "https://example.com/bg.png" },
//!   "items": [ { "id": 1, "text": "👻", "x": 0, "y": 0, "size": 80 } ],
//!   "last_id": 1
//! }
//! ```
//!
//! The background is encoded through an explicit `kind` discriminant with one
//! payload field per variant (`url` or `image_data`, base64). Field names are
//! fixed; changing them breaks existing documents.

use base64::Engine;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::document::{Background, Document};
use crate::item::{ItemId, PlacedItem};
use crate::{CoreError, CoreResult};

/// Current persisted format version.
pub const FORMAT_VERSION: u32 = 1;

const KIND_BLANK: &str = "blank";
const KIND_URL: &str = "url";
const KIND_IMAGE_DATA: &str = "image_data";

/// Wire form of a [`Background`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgroundRecord {
    /// Variant discriminant: `blank`, `url` or `image_data`.
    pub kind: String,
    /// Payload for `url`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Base64 payload for `image_data`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
}

impl From<&Background> for BackgroundRecord {
    fn from(background: &Background) -> Self {
        match background {
            Background::Blank => Self {
                kind: KIND_BLANK.to_string(),
                url: None,
                image_data: None,
            },
            Background::Url(url) => Self {
                kind: KIND_URL.to_string(),
                url: Some(url.to_string()),
                image_data: None,
            },
            Background::ImageData(data) => Self {
                kind: KIND_IMAGE_DATA.to_string(),
                url: None,
                image_data: Some(base64::engine::general_purpose::STANDARD.encode(data)),
            },
        }
    }
}

impl TryFrom<BackgroundRecord> for Background {
    type Error = CoreError;

    fn try_from(record: BackgroundRecord) -> CoreResult<Self> {
        match record.kind.as_str() {
            KIND_BLANK => Ok(Self::Blank),
            KIND_URL => {
                let raw = record.url.ok_or_else(|| {
                    CoreError::MalformedDocument("url background without `url` field".into())
                })?;
                let url = Url::parse(&raw).map_err(|e| {
                    CoreError::MalformedDocument(format!("invalid background url {raw:?}: {e}"))
                })?;
                Ok(Self::Url(url))
            }
            KIND_IMAGE_DATA => {
                let encoded = record.image_data.ok_or_else(|| {
                    CoreError::MalformedDocument(
                        "image_data background without `image_data` field".into(),
                    )
                })?;
                let bytes = base64::engine::general_purpose::STANDARD
                    .decode(encoded)
                    .map_err(|e| {
                        CoreError::MalformedDocument(format!("invalid base64 image data: {e}"))
                    })?;
                Ok(Self::ImageData(bytes))
            }
            other => Err(CoreError::MalformedDocument(format!(
                "unknown background kind {other:?}"
            ))),
        }
    }
}

/// Wire form of a [`PlacedItem`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    /// Item id.
    pub id: u64,
    /// Emoji text.
    pub text: String,
    /// Horizontal position.
    pub x: i32,
    /// Vertical position.
    pub y: i32,
    /// Glyph size.
    pub size: i32,
}

impl From<&PlacedItem> for ItemRecord {
    fn from(item: &PlacedItem) -> Self {
        Self {
            id: item.id().get(),
            text: item.text.clone(),
            x: item.x,
            y: item.y,
            size: item.size,
        }
    }
}

/// Wire form of a whole [`Document`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Format version.
    #[serde(default = "DocumentRecord::default_version")]
    pub format_version: u32,
    /// Background; absent means blank.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<BackgroundRecord>,
    /// Items in paint order.
    #[serde(default)]
    pub items: Vec<ItemRecord>,
    /// Last id handed out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_id: Option<u64>,
}

impl From<&Document> for DocumentRecord {
    fn from(document: &Document) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            background: Some(BackgroundRecord::from(document.background())),
            items: document.items().iter().map(ItemRecord::from).collect(),
            last_id: Some(document.last_id()),
        }
    }
}

impl DocumentRecord {
    const fn default_version() -> u32 {
        FORMAT_VERSION
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> CoreResult<String> {
        serde_json::to_string_pretty(self).map_err(CoreError::Serialization)
    }

    /// Parse from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a valid record.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        serde_json::from_str(json).map_err(CoreError::Serialization)
    }

    /// Convert into a runtime document.
    ///
    /// Item sizes are clamped into the allowed range.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MalformedDocument`] for an unsupported format
    /// version, an invalid background, or duplicate item ids.
    pub fn into_document(self) -> CoreResult<Document> {
        if self.format_version > FORMAT_VERSION {
            return Err(CoreError::MalformedDocument(format!(
                "unsupported format version {}",
                self.format_version
            )));
        }
        let background = match self.background {
            Some(record) => Background::try_from(record)?,
            None => Background::Blank,
        };
        let items = self
            .items
            .into_iter()
            .map(|r| PlacedItem::new(ItemId::from_raw(r.id), r.text, r.x, r.y, r.size))
            .collect();
        Document::from_parts(background, items, self.last_id.unwrap_or(0))
    }
}

/// Serde adapter that encodes byte buffers as standard base64 strings.
pub mod base64_bytes {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize bytes as base64.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
    }

    /// Deserialize bytes from base64.
    ///
    /// # Errors
    ///
    /// Fails if the input is not a string or not valid base64.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::MAX_ITEM_SIZE;

    #[test]
    fn test_document_json_round_trip() {
        let mut doc = Document::new();
        doc.set_background(Background::Url(
            Url::parse("https://example.com/bg.png").expect("url"),
        ));
        let ghost = doc.add_item("👻", (-12, 40), 80);
        doc.add_item("🎃", (3, 3), 40);
        doc.delete_item(ghost);

        let json = doc.to_json().expect("serialize");
        let restored = Document::from_json(&json).expect("parse");
        assert_eq!(restored, doc);
        assert_eq!(restored.last_id(), 2);
    }

    #[test]
    fn test_background_wire_fields_are_fixed() {
        let record = BackgroundRecord::from(&Background::Url(
            Url::parse("https://example.com/a.png").expect("url"),
        ));
        let value = serde_json::to_value(&record).expect("to value");
        assert_eq!(value["kind"], "url");
        assert_eq!(value["url"], "https://example.com/a.png");
        assert!(value.get("image_data").is_none());

        let record = BackgroundRecord::from(&Background::ImageData(vec![0xde, 0xad]));
        let value = serde_json::to_value(&record).expect("to value");
        assert_eq!(value["kind"], "image_data");
        assert_eq!(value["image_data"], "3q0=");
    }

    #[test]
    fn test_inline_image_round_trip() {
        let mut doc = Document::new();
        doc.set_background(Background::ImageData(vec![0, 1, 2, 254, 255]));
        let restored = Document::from_json(&doc.to_json().expect("json")).expect("parse");
        assert_eq!(
            restored.background().image_data(),
            Some(&[0u8, 1, 2, 254, 255][..])
        );
    }

    #[test]
    fn test_missing_background_is_blank() {
        let doc = Document::from_json(r#"{"items": []}"#).expect("parse");
        assert!(doc.background().is_blank());
        assert!(doc.is_empty());
    }

    #[test]
    fn test_unknown_kind_is_malformed() {
        let result = Document::from_json(r#"{"background": {"kind": "video"}, "items": []}"#);
        assert!(matches!(result, Err(CoreError::MalformedDocument(_))));
    }

    #[test]
    fn test_url_kind_without_payload_is_malformed() {
        let result = Document::from_json(r#"{"background": {"kind": "url"}, "items": []}"#);
        assert!(matches!(result, Err(CoreError::MalformedDocument(_))));
    }

    #[test]
    fn test_invalid_json_is_serialization_error() {
        let result = Document::from_json("{not json");
        assert!(matches!(result, Err(CoreError::Serialization(_))));
    }

    #[test]
    fn test_future_version_is_rejected() {
        let result = Document::from_json(r#"{"format_version": 99, "items": []}"#);
        assert!(matches!(result, Err(CoreError::MalformedDocument(_))));
    }

    #[test]
    fn test_oversized_items_are_clamped_on_load() {
        let doc = Document::from_json(
            r#"{"items": [{"id": 4, "text": "🐘", "x": 0, "y": 0, "size": 5000}]}"#,
        )
        .expect("parse");
        assert_eq!(doc.items()[0].size, MAX_ITEM_SIZE);
        assert_eq!(doc.last_id(), 4);
    }

    #[test]
    fn test_maximum_item_id_is_malformed() {
        let result = Document::from_json(
            r#"{"items": [
                {"id": 1, "text": "🐘", "x": 0, "y": 0, "size": 40},
                {"id": 18446744073709551615, "text": "🦒", "x": 0, "y": 0, "size": 40}
            ]}"#,
        );
        assert!(matches!(result, Err(CoreError::MalformedDocument(_))));

        let result = Document::from_json(r#"{"items": [], "last_id": 18446744073709551615}"#);
        assert!(matches!(result, Err(CoreError::MalformedDocument(_))));
    }

    #[test]
    fn test_base64_bytes_adapter() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            #[serde(with = "base64_bytes")]
            data: Vec<u8>,
        }
        let json = serde_json::to_string(&Wrapper {
            data: vec![1, 2, 3],
        })
        .expect("serialize");
        assert_eq!(json, r#"{"data":"AQID"}"#);
        let back: Wrapper = serde_json::from_str(&json).expect("parse");
        assert_eq!(back.data, vec![1, 2, 3]);
    }
}
