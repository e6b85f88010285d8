//! Named documents stored as files in a data directory.
//!
//! Each document is one pretty-printed JSON file named
//! `<sanitized name>.emojiart`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::document::Document;
use crate::{CoreError, CoreResult};

/// File extension for saved documents.
pub const DOCUMENT_EXTENSION: &str = "emojiart";

/// A directory of saved documents.
#[derive(Debug, Clone)]
pub struct DocumentLibrary {
    data_dir: PathBuf,
}

impl DocumentLibrary {
    /// Open a library rooted at `data_dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Io`] if the directory cannot be created.
    pub fn open(data_dir: impl Into<PathBuf>) -> CoreResult<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }

    /// Directory the library lives in.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// File path a document with this name is stored at.
    #[must_use]
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.data_dir
            .join(format!("{}.{DOCUMENT_EXTENSION}", sanitize_filename(name)))
    }

    /// Write a document, replacing any previous version.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, name: &str, document: &Document) -> CoreResult<PathBuf> {
        let json = document.to_json()?;
        let path = self.path_for(name);
        std::fs::write(&path, json)?;
        tracing::debug!(name, path = %path.display(), items = document.len(), "document saved");
        Ok(path)
    }

    /// Read a document.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DocumentNotFound`] if no such document exists,
    /// or a parse error if the file is not a valid document.
    pub fn load(&self, name: &str) -> CoreResult<Document> {
        let path = self.path_for(name);
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(CoreError::DocumentNotFound(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        Document::from_json(&contents)
    }

    /// Names of all stored documents, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory can't be read.
    pub fn list(&self) -> CoreResult<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.data_dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == DOCUMENT_EXTENSION) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Remove a stored document. Returns whether a file was removed.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Io`] if the file exists but cannot be removed.
    pub fn delete(&self, name: &str) -> CoreResult<bool> {
        match std::fs::remove_file(self.path_for(name)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Sanitize a name for use as a filename.
///
/// Replaces any character that is not alphanumeric, `-`, or `_` with `_`.
pub(crate) fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
