//! Layered configuration for file items
//!
//! Each file written by [`crate::FilesystemTree::mk`] gets an effective
//! configuration merged from four layers, later layers winning:
//!
//! 1. [`TreeConfig::default`]: dedent on, UTF-8
//! 2. the tree's own [`TreeConfig`], set at construction and mutable after
//! 3. the [`MkOptions`] passed to a single `mk` call
//! 4. the fields of the [`FileSpec`] itself

use serde::{Deserialize, Serialize};

use crate::encoding::DEFAULT_ENCODING;
use crate::item::FileSpec;

/// Instance-level configuration of a tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Strip common leading whitespace from text content before writing.
    pub should_dedent: bool,
    /// Label of the encoding applied to text content.
    pub encoding: String,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            should_dedent: true,
            encoding: DEFAULT_ENCODING.to_string(),
        }
    }
}

/// Call-level overrides for one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MkOptions {
    pub should_dedent: Option<bool>,
    pub encoding: Option<String>,
}

impl MkOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn should_dedent(mut self, should_dedent: bool) -> Self {
        self.should_dedent = Some(should_dedent);
        self
    }

    pub fn encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }
}

/// The settings actually used for one file item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveConfig<'a> {
    pub should_dedent: bool,
    pub encoding: &'a str,
}

impl TreeConfig {
    /// Merge this config with call-level and item-level overrides.
    pub fn resolve<'a>(&'a self, call: &'a MkOptions, item: &'a FileSpec) -> EffectiveConfig<'a> {
        let should_dedent = item
            .should_dedent
            .or(call.should_dedent)
            .unwrap_or(self.should_dedent);

        let encoding = item
            .encoding
            .as_deref()
            .or(call.encoding.as_deref())
            .unwrap_or(self.encoding.as_str());

        EffectiveConfig {
            should_dedent,
            encoding,
        }
    }
}
