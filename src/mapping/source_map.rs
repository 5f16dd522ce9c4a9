//! Offset-level bidirectional source map.
//!
//! Lookups scan the table in order. Among the entries whose origin-side range
//! contains the queried offset, the ones preferred by the [`Bias`] come first
//! (in table order), followed by entries that only touch the offset at the
//! boundary the bias steers away from. Table order is therefore the only
//! tie-break, and the table needs no sortedness invariant.

use super::range::{Bias, Mapping, MappingRange, translate};

/// Filter that accepts every entry
pub fn accept_all<D>(_: &D) -> bool {
    true
}

/// Which side of an entry a lookup starts from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Source,
    Generated,
}

impl Side {
    /// (origin, destination) ranges of `mapping` for a lookup from this side
    fn ranges<D>(self, mapping: &Mapping<D>) -> (&MappingRange, &MappingRange) {
        match self {
            Side::Source => (&mapping.source_range, &mapping.generated_range),
            Side::Generated => (&mapping.generated_range, &mapping.source_range),
        }
    }
}

/// Mapping table relating one source document to one generated document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMap<D> {
    mappings: Vec<Mapping<D>>,
}

impl<D> Default for SourceMap<D> {
    fn default() -> Self {
        Self {
            mappings: Vec::new(),
        }
    }
}

impl<D> FromIterator<Mapping<D>> for SourceMap<D> {
    fn from_iter<I: IntoIterator<Item = Mapping<D>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<D> SourceMap<D> {
    pub fn new(mappings: Vec<Mapping<D>>) -> Self {
        Self { mappings }
    }

    pub fn mappings(&self) -> &[Mapping<D>] {
        &self.mappings
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    // ========================================================================
    // Offsets
    // ========================================================================

    /// First source offset for a generated offset
    pub fn to_source_offset<F>(&self, offset: usize, filter: F, bias: Bias) -> Option<usize>
    where
        F: Fn(&D) -> bool + Copy,
    {
        self.to_source_offsets(offset, filter, bias)
            .next()
            .map(|(mapped, _)| mapped)
    }

    /// First generated offset for a source offset
    pub fn to_generated_offset<F>(&self, offset: usize, filter: F, bias: Bias) -> Option<usize>
    where
        F: Fn(&D) -> bool + Copy,
    {
        self.to_generated_offsets(offset, filter, bias)
            .next()
            .map(|(mapped, _)| mapped)
    }

    /// Every source offset a generated offset maps to, with the entry used
    pub fn to_source_offsets<F>(
        &self,
        offset: usize,
        filter: F,
        bias: Bias,
    ) -> impl Iterator<Item = (usize, &Mapping<D>)>
    where
        F: Fn(&D) -> bool + Copy,
    {
        self.match_offsets(offset, Side::Generated, filter, bias)
    }

    /// Every generated offset a source offset maps to, with the entry used
    pub fn to_generated_offsets<F>(
        &self,
        offset: usize,
        filter: F,
        bias: Bias,
    ) -> impl Iterator<Item = (usize, &Mapping<D>)>
    where
        F: Fn(&D) -> bool + Copy,
    {
        self.match_offsets(offset, Side::Source, filter, bias)
    }

    // ========================================================================
    // Ranges
    // ========================================================================

    /// First source range for a generated range
    pub fn to_source_range<F>(&self, range: MappingRange, filter: F) -> Option<MappingRange>
    where
        F: Fn(&D) -> bool + Copy,
    {
        self.to_source_ranges(range, filter)
            .next()
            .map(|(mapped, _)| mapped)
    }

    /// First generated range for a source range
    pub fn to_generated_range<F>(&self, range: MappingRange, filter: F) -> Option<MappingRange>
    where
        F: Fn(&D) -> bool + Copy,
    {
        self.to_generated_ranges(range, filter)
            .next()
            .map(|(mapped, _)| mapped)
    }

    /// Every source range a generated range maps to, with the entry matched by its start
    pub fn to_source_ranges<F>(
        &self,
        range: MappingRange,
        filter: F,
    ) -> impl Iterator<Item = (MappingRange, &Mapping<D>)>
    where
        F: Fn(&D) -> bool + Copy,
    {
        self.match_ranges(range, Side::Generated, filter)
    }

    /// Every generated range a source range maps to, with the entry matched by its start
    pub fn to_generated_ranges<F>(
        &self,
        range: MappingRange,
        filter: F,
    ) -> impl Iterator<Item = (MappingRange, &Mapping<D>)>
    where
        F: Fn(&D) -> bool + Copy,
    {
        self.match_ranges(range, Side::Source, filter)
    }

    fn match_offsets<F>(
        &self,
        offset: usize,
        from: Side,
        filter: F,
        bias: Bias,
    ) -> impl Iterator<Item = (usize, &Mapping<D>)>
    where
        F: Fn(&D) -> bool + Copy,
    {
        let preferred = self
            .mappings
            .iter()
            .filter(move |mapping| bias.prefers(from.ranges(mapping).0, offset));
        let boundary = self
            .mappings
            .iter()
            .filter(move |mapping| bias.boundary_only(from.ranges(mapping).0, offset));

        preferred
            .chain(boundary)
            .filter(move |mapping| filter(&mapping.data))
            .filter_map(move |mapping| {
                let (origin, dest) = from.ranges(mapping);
                translate(offset, origin, dest, bias).map(|mapped| (mapped, mapping))
            })
    }

    /// Two-phase range matching.
    ///
    /// Phase 1 resolves both endpoints through the single entry matched by the
    /// start. Only once every start match has been tried that way does phase 2
    /// pair each failed start with independently matched ends, discarding
    /// inverted spans. Phase 2 can pair unrelated entries; it is a heuristic.
    fn match_ranges<F>(
        &self,
        range: MappingRange,
        from: Side,
        filter: F,
    ) -> impl Iterator<Item = (MappingRange, &Mapping<D>)>
    where
        F: Fn(&D) -> bool + Copy,
    {
        let end_in_entry = move |start: usize, mapping: &Mapping<D>| {
            let (origin, dest) = from.ranges(mapping);
            translate(range.end, origin, dest, Bias::Right).filter(|end| *end >= start)
        };

        let same_entry = self
            .match_offsets(range.start, from, filter, Bias::Left)
            .filter_map(move |(start, mapping)| {
                end_in_entry(start, mapping).map(|end| (MappingRange::new(start, end), mapping))
            });

        let cross_entry = self
            .match_offsets(range.start, from, filter, Bias::Left)
            .filter(move |(start, mapping)| end_in_entry(*start, mapping).is_none())
            .flat_map(move |(start, mapping)| {
                self.match_offsets(range.end, from, filter, Bias::Right)
                    .filter(move |(end, _)| *end >= start)
                    .map(move |(end, _)| (MappingRange::new(start, end), mapping))
            });

        same_entry.chain(cross_entry)
    }
}
