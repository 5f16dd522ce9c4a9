//! Source maps bound to a fixed pair of document snapshots.
//!
//! These wrap the offset-level maps and convert LSP positions through the
//! snapshots' line indexes. A map is only meaningful for the exact snapshots
//! it was built with; a new edit produces new snapshots and a new map.

use std::sync::Arc;

use tower_lsp_server::ls_types::{Position, Range};

use super::range::{Bias, Mapping};
use super::source_map::SourceMap;
use super::teleport::TeleportMap;
use crate::document::TextSnapshot;

/// [`SourceMap`] plus the source and generated snapshots it relates
#[derive(Debug)]
pub struct DocumentSourceMap<D> {
    source: Arc<TextSnapshot>,
    generated: Arc<TextSnapshot>,
    map: SourceMap<D>,
}

impl<D> DocumentSourceMap<D> {
    pub fn new(source: Arc<TextSnapshot>, generated: Arc<TextSnapshot>, map: SourceMap<D>) -> Self {
        Self {
            source,
            generated,
            map,
        }
    }

    pub fn source(&self) -> &Arc<TextSnapshot> {
        &self.source
    }

    pub fn generated(&self) -> &Arc<TextSnapshot> {
        &self.generated
    }

    pub fn map(&self) -> &SourceMap<D> {
        &self.map
    }

    pub fn to_source_position<F>(&self, position: Position, filter: F, bias: Bias) -> Option<Position>
    where
        F: Fn(&D) -> bool + Copy,
    {
        self.to_source_positions(position, filter, bias)
            .next()
            .map(|(mapped, _)| mapped)
    }

    pub fn to_generated_position<F>(
        &self,
        position: Position,
        filter: F,
        bias: Bias,
    ) -> Option<Position>
    where
        F: Fn(&D) -> bool + Copy,
    {
        self.to_generated_positions(position, filter, bias)
            .next()
            .map(|(mapped, _)| mapped)
    }

    pub fn to_source_positions<F>(
        &self,
        position: Position,
        filter: F,
        bias: Bias,
    ) -> impl Iterator<Item = (Position, &Mapping<D>)>
    where
        F: Fn(&D) -> bool + Copy,
    {
        let offset = self.generated.offset_at(position);
        offset
            .into_iter()
            .flat_map(move |offset| self.map.to_source_offsets(offset, filter, bias))
            .filter_map(move |(mapped, mapping)| {
                self.source
                    .position_at(mapped)
                    .map(|position| (position, mapping))
            })
    }

    pub fn to_generated_positions<F>(
        &self,
        position: Position,
        filter: F,
        bias: Bias,
    ) -> impl Iterator<Item = (Position, &Mapping<D>)>
    where
        F: Fn(&D) -> bool + Copy,
    {
        let offset = self.source.offset_at(position);
        offset
            .into_iter()
            .flat_map(move |offset| self.map.to_generated_offsets(offset, filter, bias))
            .filter_map(move |(mapped, mapping)| {
                self.generated
                    .position_at(mapped)
                    .map(|position| (position, mapping))
            })
    }

    pub fn to_source_range<F>(&self, range: Range, filter: F) -> Option<Range>
    where
        F: Fn(&D) -> bool + Copy,
    {
        self.to_source_ranges(range, filter)
            .next()
            .map(|(mapped, _)| mapped)
    }

    pub fn to_generated_range<F>(&self, range: Range, filter: F) -> Option<Range>
    where
        F: Fn(&D) -> bool + Copy,
    {
        self.to_generated_ranges(range, filter)
            .next()
            .map(|(mapped, _)| mapped)
    }

    pub fn to_source_ranges<F>(
        &self,
        range: Range,
        filter: F,
    ) -> impl Iterator<Item = (Range, &Mapping<D>)>
    where
        F: Fn(&D) -> bool + Copy,
    {
        let offsets = self.generated.range_to_offsets(range);
        offsets
            .into_iter()
            .flat_map(move |offsets| self.map.to_source_ranges(offsets, filter))
            .filter_map(move |(mapped, mapping)| {
                self.source
                    .offsets_to_range(mapped)
                    .map(|range| (range, mapping))
            })
    }

    pub fn to_generated_ranges<F>(
        &self,
        range: Range,
        filter: F,
    ) -> impl Iterator<Item = (Range, &Mapping<D>)>
    where
        F: Fn(&D) -> bool + Copy,
    {
        let offsets = self.source.range_to_offsets(range);
        offsets
            .into_iter()
            .flat_map(move |offsets| self.map.to_generated_ranges(offsets, filter))
            .filter_map(move |(mapped, mapping)| {
                self.generated
                    .offsets_to_range(mapped)
                    .map(|range| (range, mapping))
            })
    }
}

/// [`TeleportMap`] plus the generated snapshot both of its sides live in
#[derive(Debug)]
pub struct DocumentTeleportMap<C> {
    document: Arc<TextSnapshot>,
    map: TeleportMap<C>,
}

impl<C> DocumentTeleportMap<C> {
    pub fn new(document: Arc<TextSnapshot>, map: TeleportMap<C>) -> Self {
        Self { document, map }
    }

    pub fn document(&self) -> &Arc<TextSnapshot> {
        &self.document
    }

    pub fn map(&self) -> &TeleportMap<C> {
        &self.map
    }

    /// Every position `position` teleports to, with the capabilities of that jump
    pub fn find_teleports(&self, position: Position) -> impl Iterator<Item = (Position, &C)> {
        let offset = self.document.offset_at(position);
        offset
            .into_iter()
            .flat_map(move |offset| self.map.find_teleports(offset))
            .filter_map(move |(target, caps)| {
                self.document
                    .position_at(target)
                    .map(|position| (position, caps))
            })
    }
}
