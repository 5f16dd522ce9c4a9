//! Mapping entries and the ranges they relate.

use serde::{Deserialize, Serialize};

/// Half-open byte range `[start, end)` into one document
///
/// Zero-length ranges are valid and denote insertion points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MappingRange {
    pub start: usize,
    pub end: usize,
}

impl MappingRange {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Zero-length range at `offset`
    pub const fn empty(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub const fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Inclusive containment: both boundaries belong to the range.
    pub const fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }
}

impl From<std::ops::Range<usize>> for MappingRange {
    fn from(range: std::ops::Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

/// Tie-break for a position exactly at a boundary shared by two entries
///
/// `Left` prefers the entry whose range ends at the boundary, `Right` the
/// entry whose range starts there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Bias {
    #[default]
    Left,
    Right,
}

impl Bias {
    /// Whether `offset` is a preferred (non tie-broken-away) hit in `range`.
    pub(crate) fn prefers(self, range: &MappingRange, offset: usize) -> bool {
        if range.is_empty() {
            return offset == range.start;
        }
        match self {
            Bias::Left => range.start < offset && offset <= range.end,
            Bias::Right => range.start <= offset && offset < range.end,
        }
    }

    /// Whether `offset` only touches the boundary this bias steers away from.
    pub(crate) fn boundary_only(self, range: &MappingRange, offset: usize) -> bool {
        if range.is_empty() {
            return false;
        }
        match self {
            Bias::Left => offset == range.start,
            Bias::Right => offset == range.end,
        }
    }
}

/// One entry of a mapping table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mapping<D> {
    pub source_range: MappingRange,
    pub generated_range: MappingRange,
    pub data: D,
}

impl<D> Mapping<D> {
    pub fn new(
        source_range: impl Into<MappingRange>,
        generated_range: impl Into<MappingRange>,
        data: D,
    ) -> Self {
        Self {
            source_range: source_range.into(),
            generated_range: generated_range.into(),
            data,
        }
    }
}

/// Translate `offset` from `from` into `to`.
///
/// `Left` measures from the start of both ranges, `Right` from their ends, so
/// the two agree whenever the ranges have equal length. A result outside `to`
/// means the entry has no correspondence for `offset`.
pub(crate) fn translate(
    offset: usize,
    from: &MappingRange,
    to: &MappingRange,
    bias: Bias,
) -> Option<usize> {
    if !from.contains(offset) {
        return None;
    }
    let mapped = match bias {
        Bias::Left => to.start.checked_add(offset - from.start)?,
        Bias::Right => to.end.checked_sub(from.end - offset)?,
    };
    to.contains(mapped).then_some(mapped)
}
