//! Concrete metadata carried by mapping entries, teleports and virtual files.
//!
//! The mapping layer itself is generic over its metadata; the feature layer
//! uses these types and filters entries by the flag a feature needs.

use serde::{Deserialize, Serialize};

/// Features a mapping entry may serve
///
/// Missing fields deserialize as `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MappingCapabilities {
    pub hover: bool,
    pub references: bool,
    pub definition: bool,
    pub rename: bool,
    pub completion: bool,
    pub diagnostic: bool,
    pub semantic_tokens: bool,
}

impl MappingCapabilities {
    /// Every feature enabled
    pub const fn full() -> Self {
        Self {
            hover: true,
            references: true,
            definition: true,
            rename: true,
            completion: true,
            diagnostic: true,
            semantic_tokens: true,
        }
    }

    /// Only navigation features (references, definition, rename)
    pub const fn navigation() -> Self {
        Self {
            references: true,
            definition: true,
            rename: true,
            ..Self::none()
        }
    }

    /// No feature enabled
    pub const fn none() -> Self {
        Self {
            hover: false,
            references: false,
            definition: false,
            rename: false,
            completion: false,
            diagnostic: false,
            semantic_tokens: false,
        }
    }
}

/// Entry metadata that can be narrowed by the entry it is nested in
///
/// A nested file's entries reach the source through a parent entry; the
/// composed entry may only serve what both entries serve.
pub trait Narrow: Clone {
    fn narrow(&self, parent: &Self) -> Self;
}

impl Narrow for MappingCapabilities {
    fn narrow(&self, parent: &Self) -> Self {
        Self {
            hover: self.hover && parent.hover,
            references: self.references && parent.references,
            definition: self.definition && parent.definition,
            rename: self.rename && parent.rename,
            completion: self.completion && parent.completion,
            diagnostic: self.diagnostic && parent.diagnostic,
            semantic_tokens: self.semantic_tokens && parent.semantic_tokens,
        }
    }
}

/// Features a teleport may carry in one direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TeleportCapabilities {
    pub references: bool,
    pub definition: bool,
    pub rename: bool,
}

impl TeleportCapabilities {
    pub const fn full() -> Self {
        Self {
            references: true,
            definition: true,
            rename: true,
        }
    }
}

/// Document-level features of a whole virtual file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FileCapabilities {
    pub diagnostic: bool,
}

impl Default for FileCapabilities {
    fn default() -> Self {
        Self { diagnostic: true }
    }
}
