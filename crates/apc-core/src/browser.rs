//! Device/preset catalog collaborator
//!
//! The host exposes its library as a handful of top-level categories, each an
//! ordered tree of named items. The surface only ever reads the tree.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level catalog categories searched by the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrowserCategory {
    Instruments,
    Drums,
    AudioEffects,
}

impl BrowserCategory {
    /// Categories in search priority order
    pub const SEARCH_ORDER: [BrowserCategory; 3] = [
        BrowserCategory::Instruments,
        BrowserCategory::Drums,
        BrowserCategory::AudioEffects,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Instruments => "instruments",
            Self::Drums => "drums",
            Self::AudioEffects => "audio_effects",
        }
    }
}

impl fmt::Display for BrowserCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node in the catalog tree (device, preset or folder)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserItem {
    pub name: String,
    pub uri: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<BrowserItem>,
}

impl BrowserItem {
    /// Create a leaf item
    pub fn new(name: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uri: uri.into(),
            children: Vec::new(),
        }
    }

    /// Attach children, consuming self
    pub fn with_children(mut self, children: Vec<BrowserItem>) -> Self {
        self.children = children;
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Read-only catalog
pub trait Browser {
    /// Direct children of a top-level category, in catalog order
    fn category(&self, category: BrowserCategory) -> &[BrowserItem];
}
