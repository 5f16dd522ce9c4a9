//! The seam to whatever decomposes a source document into embedded documents.

use dashmap::DashMap;
use url::Url;

use super::virtual_file::VirtualFile;
use super::virtual_uri::EmbeddedDocumentUri;
use crate::document::TextSnapshot;
use crate::mapping::{MappingCapabilities, TeleportCapabilities};

/// Derives the virtual file tree of a source document
///
/// Every range a provider emits must be a well-formed offset pair into its
/// document. The registry does not validate them.
pub trait EmbeddingProvider<D = MappingCapabilities, C = TeleportCapabilities>: Send + Sync {
    /// Build the tree for `source`, or `None` for a plain document
    fn embed(&self, source: &TextSnapshot) -> Option<VirtualFile<D, C>>;

    /// Source document owning an embedded document, if the provider indexes them
    fn source_uri_of(&self, _embedded_uri: &Url) -> Option<Url> {
        None
    }
}

/// In-memory provider returning a fixed tree per source URI
///
/// The tree is returned regardless of the snapshot's text; callers replace it
/// whenever they update the source document.
#[derive(Debug)]
pub struct StaticEmbeddingProvider<D = MappingCapabilities, C = TeleportCapabilities> {
    trees: DashMap<Url, VirtualFile<D, C>>,
}

impl<D, C> Default for StaticEmbeddingProvider<D, C> {
    fn default() -> Self {
        Self {
            trees: DashMap::new(),
        }
    }
}

impl<D, C> StaticEmbeddingProvider<D, C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, source_uri: Url, root: VirtualFile<D, C>) {
        self.trees.insert(source_uri, root);
    }

    pub fn remove(&self, source_uri: &Url) {
        self.trees.remove(source_uri);
    }
}

impl<D, C> EmbeddingProvider<D, C> for StaticEmbeddingProvider<D, C>
where
    D: Clone + Send + Sync,
    C: Clone + Send + Sync,
{
    fn embed(&self, source: &TextSnapshot) -> Option<VirtualFile<D, C>> {
        self.trees.get(source.uri()).map(|entry| entry.value().clone())
    }

    fn source_uri_of(&self, embedded_uri: &Url) -> Option<Url> {
        self.trees.iter().find_map(|entry| {
            let source_uri = entry.key();
            entry
                .value()
                .walk()
                .filter_map(|(_, file)| {
                    EmbeddedDocumentUri::new(source_uri, &file.file_name).to_url()
                })
                .any(|uri| EmbeddedDocumentUri::same_document(&uri, embedded_uri))
                .then(|| source_uri.clone())
        })
    }
}
