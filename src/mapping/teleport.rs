//! Equivalences between two ranges of the same generated document.
//!
//! A teleport lets navigation jump between two spots that denote one logical
//! entity (a template tag name and the binding it resolves to, say) without
//! round-tripping through the source document. Each direction carries its own
//! capability set.

use serde::{Deserialize, Serialize};

use super::range::{Bias, Mapping, MappingRange};
use super::source_map::{SourceMap, accept_all};

/// One teleport entry as supplied by an embedding provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeleportMapping<C> {
    pub range_a: MappingRange,
    pub range_b: MappingRange,
    /// Capabilities when jumping from `range_a` into `range_b`
    pub a_to_b: C,
    /// Capabilities when jumping from `range_b` into `range_a`
    pub b_to_a: C,
}

/// Per-direction capabilities stored as the metadata of a teleport entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeleportData<C> {
    pub a_to_b: C,
    pub b_to_a: C,
}

/// Teleport table of one generated document
///
/// Stored as a [`SourceMap`] whose "source" side is `range_a` and whose
/// "generated" side is `range_b`; both live in the same document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeleportMap<C> {
    map: SourceMap<TeleportData<C>>,
}

impl<C> Default for TeleportMap<C> {
    fn default() -> Self {
        Self {
            map: SourceMap::default(),
        }
    }
}

impl<C> TeleportMap<C> {
    pub fn new(entries: Vec<TeleportMapping<C>>) -> Self {
        let map = entries
            .into_iter()
            .map(|entry| {
                Mapping::new(
                    entry.range_a,
                    entry.range_b,
                    TeleportData {
                        a_to_b: entry.a_to_b,
                        b_to_a: entry.b_to_a,
                    },
                )
            })
            .collect();
        Self { map }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Every position `offset` teleports to, with the capabilities of that jump.
    ///
    /// Entries whose `range_a` contains `offset` yield a target in `range_b`
    /// carrying `a_to_b`; entries whose `range_b` contains it yield a target in
    /// `range_a` carrying `b_to_a`.
    pub fn find_teleports(&self, offset: usize) -> impl Iterator<Item = (usize, &C)> {
        let forward = self
            .map
            .to_generated_offsets(offset, accept_all, Bias::Left)
            .map(|(target, entry)| (target, &entry.data.a_to_b));
        let backward = self
            .map
            .to_source_offsets(offset, accept_all, Bias::Left)
            .map(|(target, entry)| (target, &entry.data.b_to_a));
        forward.chain(backward)
    }
}
