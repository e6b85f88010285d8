//! Emoji palettes.
//!
//! A [`PaletteStore`] holds an ordered list of named palettes. It is never
//! empty: it is seeded with built-in palettes when nothing is stored, and
//! refuses to remove its last palette. With a data directory, every change
//! is written to `palettes-<name>.json`.

use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::emoji;
use crate::library::sanitize_filename;
use crate::{CoreError, CoreResult};

/// A named strip of emoji to pick from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Palette {
    /// Display name.
    pub name: String,
    /// The emoji, concatenated.
    pub emojis: String,
    /// Unique id within its store.
    pub id: u64,
}

impl Palette {
    /// The palette's emoji, one per element.
    pub fn characters(&self) -> impl Iterator<Item = &str> {
        emoji::characters(&self.emojis)
    }
}

const BUILT_IN: &[(&str, &str)] = &[
    ("Vehicles", "🚙🚗🚘🚕🚖🏎🚚🛻🚛🚐🚓🚔🚑🚒🚀✈️🛫🛬🛩🚁🛸🚲🏍🛶⛵️🚤🛥🛳⛴🚢🚂🚝🚅🚆🚊🚉🚇🛺🚜"),
    ("Sports", "🏈⚾️🏀⚽️🎾🏐🥏🏓⛳️🥅🥌🏂⛷🎳"),
    ("Music", "🎼🎤🎹🪘🥁🎺🪗🪕🎻"),
    ("Animals", "🐥🐣🐂🐄🐎🐖🐏🐑🦙🐐🐓🐁🐀🐒🦆🦅🦉🦇🐢🐍🦎🦖🦕🐅🐆🦓🦍🦧🦣🐘🦛🦏🐪🐫🦒🦘🦬🐃🦙🐐🦌🐕🐩🦮🐈🦤🦢🦩🕊🦝🦨🦡🦫🦦🦥🐿🦔"),
    ("Animal Faces", "🐵🙈🙊🙉🐶🐱🐭🐹🐰🦊🐻🐼🐻‍❄️🐨🐯🦁🐮🐷🐸🐲"),
    ("Flora", "🌲🌴🌿☘️🍀🍁🍄🌾💐🌷🌹🥀🌺🌸🌼🌻"),
    ("Weather", "☀️🌤⛅️🌥☁️🌦🌧⛈🌩🌨❄️💨☔️💧💦🌊☂️🌫🌪"),
    ("COVID", "💉🦠😷🤧🤒"),
    ("Faces", "😀😃😄😁😆😅😂🤣🥲☺️😊😇🙂🙃😉😌😍🥰😘😗😙😚😋😛😝😜🤪🤨🧐🤓😎🥸🤩🥳😏😞😔😟😕🙁☹️😣😖😫😩🥺😢😭😤😠😡🤯😳🥶😥😓🤗🤔🤭🤫🤥😬🙄😯😧🥱😴🤮😷🤧🤒🤠"),
];

/// An ordered, never-empty collection of palettes.
#[derive(Debug, Clone)]
pub struct PaletteStore {
    name: String,
    palettes: Vec<Palette>,
    /// Optional data directory for filesystem persistence.
    data_dir: Option<PathBuf>,
}

impl PaletteStore {
    /// Create a store seeded with the built-in palettes (no persistence).
    #[must_use]
    pub fn in_memory(name: impl Into<String>) -> Self {
        let mut store = Self {
            name: name.into(),
            palettes: Vec::new(),
            data_dir: None,
        };
        store.seed_built_in();
        store
    }

    /// Create a store persisted in `data_dir`.
    ///
    /// Previously saved palettes are restored. If none are stored, or the
    /// stored file cannot be read, the built-in palettes are used.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Io`] if the directory cannot be created.
    pub fn with_data_dir(name: impl Into<String>, data_dir: impl Into<PathBuf>) -> CoreResult<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        let mut store = Self {
            name: name.into(),
            palettes: Vec::new(),
            data_dir: Some(data_dir),
        };
        store.palettes = store.restore().unwrap_or_default();
        if store.palettes.is_empty() {
            tracing::info!(store = %store.name, "using built-in palettes");
            store.seed_built_in();
        } else {
            tracing::info!(store = %store.name, count = store.palettes.len(), "restored palettes");
        }
        Ok(store)
    }

    fn seed_built_in(&mut self) {
        for (name, emojis) in BUILT_IN {
            self.insert(*name, Some(*emojis), 0);
        }
    }

    /// Store name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All palettes in order.
    #[must_use]
    pub fn palettes(&self) -> &[Palette] {
        &self.palettes
    }

    /// Number of palettes; always at least one.
    #[must_use]
    pub fn len(&self) -> usize {
        self.palettes.len()
    }

    /// Always `false`; kept for API symmetry with [`len`](Self::len).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.palettes.is_empty()
    }

    /// Palette at `index`, clamped into range.
    #[must_use]
    pub fn palette(&self, index: usize) -> &Palette {
        &self.palettes[index.min(self.palettes.len() - 1)]
    }

    /// Insert a new palette at `index` (clamped) and return its id.
    ///
    /// Ids are one more than the largest id in the store.
    pub fn insert(&mut self, name: impl Into<String>, emojis: Option<&str>, index: usize) -> u64 {
        let id = self.palettes.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        let palette = Palette {
            name: name.into(),
            emojis: emojis.unwrap_or_default().to_string(),
            id,
        };
        let index = index.min(self.palettes.len());
        self.palettes.insert(index, palette);
        self.persist();
        id
    }

    /// Remove the palette at `index` unless it is the last one.
    ///
    /// Returns the index to show next.
    pub fn remove(&mut self, index: usize) -> usize {
        if self.palettes.len() > 1 && index < self.palettes.len() {
            let removed = self.palettes.remove(index);
            tracing::debug!(name = %removed.name, "palette removed");
            self.persist();
        }
        index % self.palettes.len()
    }

    /// Move the palette at `from` so it ends up at `to` (clamped).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::PaletteNotFound`] if `from` is out of range.
    pub fn move_palette(&mut self, from: usize, to: usize) -> CoreResult<()> {
        if from >= self.palettes.len() {
            return Err(CoreError::PaletteNotFound(from));
        }
        let palette = self.palettes.remove(from);
        let to = to.min(self.palettes.len());
        self.palettes.insert(to, palette);
        self.persist();
        Ok(())
    }

    /// Rename the palette at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::PaletteNotFound`] if `index` is out of range.
    pub fn rename(&mut self, index: usize, name: impl Into<String>) -> CoreResult<()> {
        self.palette_mut(index)?.name = name.into();
        self.persist();
        Ok(())
    }

    /// Add the emoji found in `text` to the front of the palette at `index`.
    ///
    /// Non-emoji characters are dropped and each emoji is kept once.
    /// Returns how many emoji were added.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::PaletteNotFound`] if `index` is out of range.
    pub fn add_emojis(&mut self, index: usize, text: &str) -> CoreResult<usize> {
        let palette = self.palette_mut(index)?;
        let combined = format!("{text}{}", palette.emojis);
        let mut seen = HashSet::new();
        let emojis: String = emoji::emoji_characters(&combined)
            .filter(|c| seen.insert(*c))
            .collect();
        let existing: HashSet<&str> = emoji::emoji_characters(&palette.emojis).collect();
        let added = seen.difference(&existing).count();
        palette.emojis = emojis;
        self.persist();
        Ok(added)
    }

    /// Remove one emoji from the palette at `index`.
    ///
    /// Returns whether it was present.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::PaletteNotFound`] if `index` is out of range.
    pub fn remove_emoji(&mut self, index: usize, emoji: &str) -> CoreResult<bool> {
        let palette = self.palette_mut(index)?;
        let kept: String = palette.characters().filter(|c| *c != emoji).collect();
        if kept.len() == palette.emojis.len() {
            return Ok(false);
        }
        palette.emojis = kept;
        self.persist();
        Ok(true)
    }

    fn palette_mut(&mut self, index: usize) -> CoreResult<&mut Palette> {
        self.palettes
            .get_mut(index)
            .ok_or(CoreError::PaletteNotFound(index))
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    fn storage_path(&self) -> Option<PathBuf> {
        self.data_dir
            .as_ref()
            .map(|dir| dir.join(format!("palettes-{}.json", sanitize_filename(&self.name))))
    }

    /// Save palettes to disk. No-op without a data directory.
    fn persist(&self) {
        let Some(path) = self.storage_path() else {
            return;
        };
        let json = match serde_json::to_string_pretty(&self.palettes) {
            Ok(j) => j,
            Err(e) => {
                tracing::warn!("Failed to serialize palettes {}: {e}", self.name);
                return;
            }
        };
        if let Err(e) = std::fs::write(&path, json) {
            tracing::warn!("Failed to persist palettes to {}: {e}", path.display());
        }
    }

    fn restore(&self) -> Option<Vec<Palette>> {
        let path = self.storage_path()?;
        let contents = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(palettes) => Some(palettes),
            Err(e) => {
                tracing::warn!("Ignoring unreadable palettes at {}: {e}", path.display());
                None
            }
        }
    }
}
