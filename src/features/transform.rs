//! Rewriting plugin results from embedded into source coordinates.
//!
//! Results may point into the queried embedded document, into another
//! embedded document, or into a real file. Embedded locations are translated
//! through their own map; real-file locations pass through unchanged. An
//! embedded location with no source counterpart is dropped.
//!
//! Maps are taken from the bundle the plugin was queried on, so an edit that
//! lands while a plugin call is pending never changes how its results are
//! translated. Only documents outside that bundle go through the registry.

use std::str::FromStr;
use std::sync::Arc;

use tower_lsp_server::ls_types::{Location, LocationLink, Range, Uri};
use url::Url;

use super::worker::{CapabilityFilter, QueryTarget};
use crate::embedding::{DocumentRegistry, EmbeddedDocumentUri};
use crate::mapping::{DocumentSourceMap, MappingCapabilities};

pub fn uri_to_url(uri: &Uri) -> Option<Url> {
    Url::parse(uri.as_str()).ok()
}

pub fn url_to_uri(url: &Url) -> Option<Uri> {
    Uri::from_str(url.as_str()).ok()
}

/// Translates ranges owned by arbitrary documents back to source documents
#[derive(Clone, Copy)]
pub struct SourceTranslator<'a> {
    registry: &'a DocumentRegistry,
    filter: CapabilityFilter,
}

impl<'a> SourceTranslator<'a> {
    pub fn new(registry: &'a DocumentRegistry, filter: CapabilityFilter) -> Self {
        Self { registry, filter }
    }

    /// Translate `range` of document `uri`, found in a result for `target`
    pub fn range(&self, uri: &Uri, range: Range, target: &QueryTarget) -> Option<(Uri, Range)> {
        let Some(map) = uri_to_url(uri).and_then(|url| self.map_for(&url, target)) else {
            return Some((uri.clone(), range));
        };
        let translated = map.to_source_range(range, self.filter);
        if translated.is_none() {
            log::debug!(
                target: "embedmap::transform",
                "No source range for {:?} in {}",
                range,
                uri.as_str()
            );
        }
        Some((url_to_uri(map.source().uri())?, translated?))
    }

    /// Map owning `url`: the queried document, its bundle, then the registry
    fn map_for(&self, url: &Url, target: &QueryTarget) -> Option<Arc<DocumentSourceMap<MappingCapabilities>>> {
        if let Some(embedded) = &target.embedded
            && EmbeddedDocumentUri::same_document(url, embedded.uri())
        {
            return Some(Arc::clone(embedded.map()));
        }
        if let Some(map) = target.bundle.as_ref().and_then(|bundle| bundle.map(url)) {
            return Some(Arc::clone(map));
        }
        self.registry.get_map(url)
    }

    /// Translate a `(range, selection_range)` pair of document `uri`
    ///
    /// The selection must translate; the enclosing range falls back to the
    /// translated selection when it spans unmapped text.
    pub fn range_pair(
        &self,
        uri: &Uri,
        range: Range,
        selection_range: Range,
        target: &QueryTarget,
    ) -> Option<(Uri, Range, Range)> {
        let (source_uri, selection) = self.range(uri, selection_range, target)?;
        let enclosing = self
            .range(uri, range, target)
            .map(|(_, enclosing)| enclosing)
            .unwrap_or(selection);
        Some((source_uri, enclosing, selection))
    }

    /// Translate a range that belongs to the queried document itself
    pub fn origin_range(&self, target: &QueryTarget, range: Range) -> Option<Range> {
        match &target.embedded {
            Some(embedded) => embedded.map().to_source_range(range, self.filter),
            None => Some(range),
        }
    }

    pub fn location(&self, location: Location, target: &QueryTarget) -> Option<Location> {
        let (uri, range) = self.range(&location.uri, location.range, target)?;
        Some(Location { uri, range })
    }

    pub fn location_link(&self, link: LocationLink, target: &QueryTarget) -> Option<LocationLink> {
        let (target_uri, target_range, target_selection_range) = self.range_pair(
            &link.target_uri,
            link.target_range,
            link.target_selection_range,
            target,
        )?;
        let origin_selection_range = link
            .origin_selection_range
            .and_then(|range| self.origin_range(target, range));
        Some(LocationLink {
            origin_selection_range,
            target_uri,
            target_range,
            target_selection_range,
        })
    }
}
