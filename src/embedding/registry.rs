//! Document registry: embedded documents and their maps, cached per snapshot.
//!
//! The cache is keyed by [`SnapshotToken`], the identity of a source snapshot,
//! never by path or content. Every edit mints a new snapshot, so a stale map
//! can never be served for changed text, while repeated queries against one
//! unchanged snapshot share the same bundle. Bundles are immutable once built
//! and the cache is bounded by an LRU policy.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use lru::LruCache;
use url::Url;

use super::provider::EmbeddingProvider;
use super::virtual_file::VirtualFile;
use super::virtual_uri::EmbeddedDocumentUri;
use crate::document::{DocumentStore, SnapshotToken, TextSnapshot};
use crate::error::LockResultExt;
use crate::mapping::{
    DocumentSourceMap, DocumentTeleportMap, FileCapabilities, Mapping, MappingCapabilities,
    Narrow, SourceMap, TeleportCapabilities, TeleportMap, accept_all,
};

/// Default number of source snapshots whose bundles stay cached
pub const DEFAULT_CACHE_CAPACITY: usize = 32;

/// One embedded document of a bundle, with its maps relative to the source
#[derive(Debug)]
pub struct EmbeddedDocument<D = MappingCapabilities, C = TeleportCapabilities> {
    file_name: String,
    depth: usize,
    capabilities: FileCapabilities,
    map: Arc<DocumentSourceMap<D>>,
    teleport: Option<Arc<DocumentTeleportMap<C>>>,
}

impl<D, C> EmbeddedDocument<D, C> {
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Depth in the virtual file tree (the root is 0)
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn uri(&self) -> &Url {
        self.map.generated().uri()
    }

    pub fn language_id(&self) -> &str {
        self.map.generated().language_id()
    }

    pub fn snapshot(&self) -> &Arc<TextSnapshot> {
        self.map.generated()
    }

    pub fn capabilities(&self) -> FileCapabilities {
        self.capabilities
    }

    pub fn map(&self) -> &Arc<DocumentSourceMap<D>> {
        &self.map
    }

    pub fn teleport(&self) -> Option<&Arc<DocumentTeleportMap<C>>> {
        self.teleport.as_ref()
    }
}

/// Everything derived from one source snapshot
#[derive(Debug)]
pub struct EmbeddedDocuments<D = MappingCapabilities, C = TeleportCapabilities> {
    source: Arc<TextSnapshot>,
    root: VirtualFile<D, C>,
    documents: Vec<Arc<EmbeddedDocument<D, C>>>,
}

impl<D: Narrow, C: Clone> EmbeddedDocuments<D, C> {
    /// Build maps for every node of `root`, in pre-order.
    ///
    /// Nested files map to their parent; their entries are composed through
    /// the ancestors' maps so that every map relates its file to the source.
    /// A composed entry carries its own metadata narrowed by the parent entry
    /// its start was traced through. Nested entries whose parent range cannot
    /// be traced to the source are dropped. Files whose URI cannot be formed are skipped with their
    /// subtree.
    pub fn build(source: Arc<TextSnapshot>, root: VirtualFile<D, C>) -> Self {
        let mut documents = Vec::new();
        collect_documents(&source, &root, None, 0, &mut documents);
        Self {
            source,
            root,
            documents,
        }
    }
}

fn collect_documents<D: Narrow, C: Clone>(
    source: &Arc<TextSnapshot>,
    file: &VirtualFile<D, C>,
    parent: Option<&SourceMap<D>>,
    depth: usize,
    out: &mut Vec<Arc<EmbeddedDocument<D, C>>>,
) {
    let Some(uri) = EmbeddedDocumentUri::new(source.uri(), &file.file_name).to_url() else {
        log::warn!(
            target: "embedmap::registry",
            "Cannot form a URI for embedded file {} of {}",
            file.file_name,
            source.uri()
        );
        return;
    };

    let mappings: Vec<Mapping<D>> = match parent {
        None => file.mappings.clone(),
        Some(parent) => file
            .mappings
            .iter()
            .filter_map(|mapping| {
                let traced = parent
                    .to_source_ranges(mapping.source_range, accept_all)
                    .next();
                if traced.is_none() {
                    log::debug!(
                        target: "embedmap::registry",
                        "Dropping untraceable mapping {:?} of {}",
                        mapping.source_range,
                        file.file_name
                    );
                }
                traced.map(|(source_range, through)| {
                    Mapping::new(
                        source_range,
                        mapping.generated_range,
                        mapping.data.narrow(&through.data),
                    )
                })
            })
            .collect(),
    };

    let generated = Arc::new(TextSnapshot::new(
        uri,
        file.language_id.clone(),
        source.version(),
        file.text.clone(),
    ));
    let teleport = (!file.teleports.is_empty()).then(|| {
        Arc::new(DocumentTeleportMap::new(
            Arc::clone(&generated),
            TeleportMap::new(file.teleports.clone()),
        ))
    });
    let document = Arc::new(EmbeddedDocument {
        file_name: file.file_name.clone(),
        depth,
        capabilities: file.capabilities,
        map: Arc::new(DocumentSourceMap::new(
            Arc::clone(source),
            generated,
            SourceMap::new(mappings),
        )),
        teleport,
    });
    out.push(Arc::clone(&document));

    for child in &file.embedded_files {
        collect_documents(source, child, Some(document.map.map()), depth + 1, out);
    }
}

impl<D, C> EmbeddedDocuments<D, C> {
    pub fn source(&self) -> &Arc<TextSnapshot> {
        &self.source
    }

    pub fn root(&self) -> &VirtualFile<D, C> {
        &self.root
    }

    /// Embedded documents in pre-order
    pub fn documents(&self) -> impl Iterator<Item = &Arc<EmbeddedDocument<D, C>>> {
        self.documents.iter()
    }

    /// Look up an embedded document by URI (ASCII case-insensitive)
    pub fn document(&self, uri: &Url) -> Option<&Arc<EmbeddedDocument<D, C>>> {
        self.documents
            .iter()
            .find(|document| EmbeddedDocumentUri::same_document(document.uri(), uri))
    }

    pub fn map(&self, uri: &Url) -> Option<&Arc<DocumentSourceMap<D>>> {
        self.document(uri).map(|document| document.map())
    }

    pub fn teleport(&self, uri: &Url) -> Option<&Arc<DocumentTeleportMap<C>>> {
        self.document(uri).and_then(|document| document.teleport())
    }
}

/// Cached outcome for one snapshot; `bundle` is `None` for plain documents
struct CacheEntry<D, C> {
    source_uri: Url,
    bundle: Option<Arc<EmbeddedDocuments<D, C>>>,
}

/// Lazily builds and caches [`EmbeddedDocuments`] per source snapshot
pub struct DocumentRegistry<D = MappingCapabilities, C = TeleportCapabilities> {
    store: Arc<DocumentStore>,
    provider: Arc<dyn EmbeddingProvider<D, C>>,
    cache: Mutex<LruCache<SnapshotToken, CacheEntry<D, C>>>,
    /// Embedded URI (lowercased) → owning source URI, filled as bundles are built
    embedded_index: DashMap<String, Url>,
}

impl<D, C> std::fmt::Debug for DocumentRegistry<D, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentRegistry")
            .field("store", &self.store)
            .field("provider", &"Arc<dyn EmbeddingProvider>")
            .field("embedded_index", &self.embedded_index.len())
            .finish_non_exhaustive()
    }
}

impl<D: Narrow, C: Clone> DocumentRegistry<D, C> {
    /// Create a registry caching at most `capacity` snapshots (at least one)
    pub fn new(
        store: Arc<DocumentStore>,
        provider: Arc<dyn EmbeddingProvider<D, C>>,
        capacity: usize,
    ) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            store,
            provider,
            cache: Mutex::new(LruCache::new(capacity)),
            embedded_index: DashMap::new(),
        }
    }

    pub fn store(&self) -> &Arc<DocumentStore> {
        &self.store
    }

    /// Bundle for the current snapshot of `uri`
    ///
    /// `None` when the document is not open or has no embedded documents.
    pub fn get(&self, uri: &Url) -> Option<Arc<EmbeddedDocuments<D, C>>> {
        let snapshot = self.store.get(uri)?;
        self.get_for_snapshot(&snapshot)
    }

    /// Bundle for a specific snapshot, building it on a cache miss
    pub fn get_for_snapshot(
        &self,
        snapshot: &Arc<TextSnapshot>,
    ) -> Option<Arc<EmbeddedDocuments<D, C>>> {
        let token = snapshot.token();
        if let Some(hit) = self.cached(token) {
            log::debug!(
                target: "embedmap::registry",
                "Cache hit for {} (version {})",
                snapshot.uri(),
                snapshot.version()
            );
            return hit;
        }

        log::debug!(
            target: "embedmap::registry",
            "Cache miss for {} (version {}), building embedded documents",
            snapshot.uri(),
            snapshot.version()
        );

        // Built outside the lock; concurrent builders of one snapshot race
        // harmlessly and the first stored bundle wins.
        let built = self
            .provider
            .embed(snapshot)
            .map(|root| Arc::new(EmbeddedDocuments::build(Arc::clone(snapshot), root)));

        if let Some(bundle) = &built {
            for document in bundle.documents() {
                self.embedded_index.insert(
                    EmbeddedDocumentUri::index_key(document.uri()),
                    snapshot.uri().clone(),
                );
            }
        }

        let mut cache = self.cache.lock().recover_poison("registry cache").ok()?;
        if let Some(existing) = cache.get(&token) {
            return existing.bundle.clone();
        }
        cache.put(
            token,
            CacheEntry {
                source_uri: snapshot.uri().clone(),
                bundle: built.clone(),
            },
        );
        built
    }

    /// Map of the embedded document `embedded_uri`, via its owning source
    pub fn get_map(&self, embedded_uri: &Url) -> Option<Arc<DocumentSourceMap<D>>> {
        self.get_embedded(embedded_uri)
            .map(|document| Arc::clone(document.map()))
    }

    /// Teleports of the embedded document `embedded_uri`, if it has any
    pub fn get_teleport(&self, embedded_uri: &Url) -> Option<Arc<DocumentTeleportMap<C>>> {
        self.get_embedded(embedded_uri)
            .and_then(|document| document.teleport().cloned())
    }

    /// Embedded document by URI, rebuilding its owner's bundle if needed
    pub fn get_embedded(&self, embedded_uri: &Url) -> Option<Arc<EmbeddedDocument<D, C>>> {
        self.get_embedded_with_bundle(embedded_uri)
            .map(|(_, document)| document)
    }

    /// Embedded document by URI together with the bundle that owns it
    pub fn get_embedded_with_bundle(
        &self,
        embedded_uri: &Url,
    ) -> Option<(Arc<EmbeddedDocuments<D, C>>, Arc<EmbeddedDocument<D, C>>)> {
        let source_uri = self.source_uri_of(embedded_uri)?;
        let bundle = self.get(&source_uri)?;
        let document = Arc::clone(bundle.document(embedded_uri)?);
        Some((bundle, document))
    }

    /// Whether `uri` names an embedded document known to the provider or registry
    pub fn is_embedded(&self, uri: &Url) -> bool {
        self.source_uri_of(uri).is_some()
    }

    fn source_uri_of(&self, embedded_uri: &Url) -> Option<Url> {
        self.provider.source_uri_of(embedded_uri).or_else(|| {
            self.embedded_index
                .get(&EmbeddedDocumentUri::index_key(embedded_uri))
                .map(|entry| entry.value().clone())
        })
    }

    /// Close a source document and forget everything derived from it
    pub fn remove_document(&self, uri: &Url) {
        self.store.close(uri);
        self.embedded_index.retain(|_, source| source != uri);

        if let Ok(mut cache) = self.cache.lock().recover_poison("registry cache") {
            let stale: Vec<SnapshotToken> = cache
                .iter()
                .filter(|(_, entry)| &entry.source_uri == uri)
                .map(|(token, _)| *token)
                .collect();
            for token in stale {
                cache.pop(&token);
            }
        }
    }

    /// Number of snapshots currently cached
    pub fn cached_len(&self) -> usize {
        self.cache
            .lock()
            .recover_poison("registry cache")
            .map(|cache| cache.len())
            .unwrap_or(0)
    }

    fn cached(&self, token: SnapshotToken) -> Option<Option<Arc<EmbeddedDocuments<D, C>>>> {
        let mut cache = self.cache.lock().recover_poison("registry cache").ok()?;
        cache.get(&token).map(|entry| entry.bundle.clone())
    }
}
