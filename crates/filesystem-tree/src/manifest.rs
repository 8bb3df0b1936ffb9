//! Tree definitions stored in fixture files
//!
//! A manifest holds a `tree` array of untyped items plus optional
//! `should_dedent` and `encoding` overrides for the whole batch:
//!
//! ```toml
//! should_dedent = false
//! tree = [
//!     "some/dir",
//!     ["some/dir/file.txt", "Greetings, program!"],
//! ]
//! ```

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::{Error, MkOptions, Result};

/// Supported manifest file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Json,
    Yaml,
    Toml,
}

impl ManifestFormat {
    /// Detect the format from a file extension:
    /// - `.toml` -> TOML
    /// - `.json` -> JSON
    /// - `.yaml`, `.yml` -> YAML
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(Error::UnsupportedFormat { extension }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Yaml => "YAML",
            Self::Toml => "TOML",
        }
    }
}

/// A tree definition loaded from a fixture file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TreeManifest {
    #[serde(default)]
    pub tree: Vec<Value>,
    #[serde(default)]
    pub should_dedent: Option<bool>,
    #[serde(default)]
    pub encoding: Option<String>,
}

impl TreeManifest {
    /// Load a manifest, detecting the format from the file extension.
    pub fn load(path: &Path) -> Result<Self> {
        let format = ManifestFormat::from_path(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::parse(&content, format, path)
    }

    /// Parse manifest text. `origin` only labels errors.
    pub fn parse(content: &str, format: ManifestFormat, origin: &Path) -> Result<Self> {
        let parsed: std::result::Result<Self, String> = match format {
            ManifestFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
            ManifestFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            ManifestFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        };

        parsed.map_err(|message| Error::ManifestParse {
            path: origin.to_path_buf(),
            format: format.as_str().into(),
            message,
        })
    }

    /// Batch-level overrides declared by the manifest.
    pub fn options(&self) -> MkOptions {
        MkOptions {
            should_dedent: self.should_dedent,
            encoding: self.encoding.clone(),
        }
    }
}
