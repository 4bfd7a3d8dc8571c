//! File-backed blob store for the board document.
//!
//! The store treats the document as opaque JSON: it returns exactly what was
//! last written and never validates the shape. One file, rewritten in full on
//! every save.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;

pub const DATA_FILE: &str = "data.json";

#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// A store writing `data.json` inside `data_dir`. The directory is created
    /// on first write.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(DATA_FILE),
        }
    }

    /// A store in the platform data directory (e.g. `~/.local/share/workboard`).
    pub fn open_default() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "workboard")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        Ok(Self::new(dirs.data_dir()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The empty document as JSON.
    pub fn empty() -> Value {
        serde_json::json!({ "releases": [], "featureAreas": [], "tasks": [] })
    }

    /// Read the stored document.
    ///
    /// A missing file or unparseable contents yield [`FileStore::empty`]. Only
    /// an I/O error while reading an existing file is returned as an error.
    pub fn read(&self) -> Result<Value> {
        if !self.path.exists() {
            return Ok(Self::empty());
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;

        match serde_json::from_str(&content) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::warn!(
                    "Stored document at {} is not valid JSON, serving empty board: {}",
                    self.path.display(),
                    e
                );
                Ok(Self::empty())
            }
        }
    }

    /// Overwrite the stored document, pretty-printed.
    pub fn write(&self, document: &Value) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let content =
            serde_json::to_string_pretty(document).context("Failed to serialize document")?;
        std::fs::write(&self.path, &content)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;

        tracing::debug!("Saved {} bytes to {}", content.len(), self.path.display());
        Ok(())
    }
}
