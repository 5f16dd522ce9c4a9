//! Fan-out of one feature request over every (plugin, document) pair that can
//! answer it, and fan-in of the translated results.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use futures::future::{BoxFuture, join_all};
use tower_lsp_server::ls_types::Position;
use url::Url;

use crate::config::FeatureSettings;
use crate::document::TextSnapshot;
use crate::embedding::{DocumentRegistry, EmbeddedDocument, EmbeddedDocuments};
use crate::error::PluginResult;
use crate::mapping::{Bias, FileCapabilities, MappingCapabilities, TeleportCapabilities};
use crate::plugin::LanguagePlugin;

/// Selects the mapping entries a feature may travel through
pub type CapabilityFilter = fn(&MappingCapabilities) -> bool;

/// Selects the teleports a feature may follow
pub type TeleportFilter = fn(&TeleportCapabilities) -> bool;

/// Selects the embedded files a document-level feature applies to
pub type FileFilter = fn(&FileCapabilities) -> bool;

/// One pending plugin call
pub type PluginFuture<R> = BoxFuture<'static, PluginResult<Option<R>>>;

/// Entry and teleport filters of one feature
#[derive(Debug, Clone, Copy)]
pub struct FeatureFilter {
    pub mapping: CapabilityFilter,
    /// `None` when the feature never follows teleports
    pub teleport: Option<TeleportFilter>,
}

/// The plugin and document one raw result came from
#[derive(Clone)]
pub struct QueryTarget {
    pub plugin: Arc<dyn LanguagePlugin>,
    /// The document the plugin was queried on
    pub document: Arc<TextSnapshot>,
    /// The embedded document, or `None` on the plain-document path
    pub embedded: Option<Arc<EmbeddedDocument>>,
    /// The bundle `embedded` belongs to; results are translated through it
    pub bundle: Option<Arc<EmbeddedDocuments>>,
}

impl std::fmt::Debug for QueryTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryTarget")
            .field("plugin", &self.plugin.name())
            .field("document", &self.document.uri().as_str())
            .field("embedded", &self.embedded.is_some())
            .field("version", &self.bundle.as_ref().map(|b| b.source().version()))
            .finish()
    }
}

/// A position inside an embedded document that a source position reaches
#[derive(Debug, Clone)]
pub struct Candidate {
    pub document: Arc<EmbeddedDocument>,
    pub position: Position,
    /// Reached through a teleport rather than through the source map
    pub via_teleport: bool,
}

pub struct FeatureWorker {
    registry: Arc<DocumentRegistry>,
    plugins: Vec<Arc<dyn LanguagePlugin>>,
    settings: FeatureSettings,
}

impl std::fmt::Debug for FeatureWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureWorker")
            .field("registry", &self.registry)
            .field(
                "plugins",
                &self.plugins.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field("settings", &self.settings)
            .finish()
    }
}

impl FeatureWorker {
    pub fn new(registry: Arc<DocumentRegistry>, settings: FeatureSettings) -> Self {
        Self {
            registry,
            plugins: Vec::new(),
            settings,
        }
    }

    /// Register a plugin; registration order is the result order among plugins
    pub fn with_plugin(mut self, plugin: Arc<dyn LanguagePlugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    pub fn registry(&self) -> &Arc<DocumentRegistry> {
        &self.registry
    }

    pub fn settings(&self) -> &FeatureSettings {
        &self.settings
    }

    /// Look up a registered plugin by name
    pub fn plugin(&self, name: &str) -> Option<&Arc<dyn LanguagePlugin>> {
        self.plugins.iter().find(|plugin| plugin.name() == name)
    }

    fn plugins_for<'a>(
        &'a self,
        language_id: &'a str,
    ) -> impl Iterator<Item = &'a Arc<dyn LanguagePlugin>> + 'a {
        self.plugins
            .iter()
            .filter(move |plugin| plugin.supports_language(language_id))
    }

    /// Every embedded position `position` reaches, in discovery order
    ///
    /// Embedded documents are visited in pre-order. For each one, positions
    /// reached through its source map come first, followed (when enabled) by
    /// positions transitively reachable through its teleports. Each
    /// `(document, position)` pair appears once.
    pub fn resolve_candidates(
        &self,
        bundle: &EmbeddedDocuments,
        position: Position,
        filter: FeatureFilter,
    ) -> Vec<Candidate> {
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();

        for (index, document) in bundle.documents().enumerate() {
            let direct: Vec<Position> = document
                .map()
                .to_generated_positions(position, filter.mapping, Bias::Left)
                .map(|(generated, _)| generated)
                .collect();

            let mut queue = VecDeque::new();
            for generated in direct {
                if seen.insert((index, generated.line, generated.character)) {
                    candidates.push(Candidate {
                        document: Arc::clone(document),
                        position: generated,
                        via_teleport: false,
                    });
                    queue.push_back(generated);
                }
            }

            let teleport = match (filter.teleport, document.teleport()) {
                (Some(accepts), Some(teleport)) if self.settings.follow_teleports => {
                    Some((accepts, teleport))
                }
                _ => None,
            };
            let Some((accepts, teleport)) = teleport else {
                continue;
            };

            while let Some(from) = queue.pop_front() {
                for (target, caps) in teleport.find_teleports(from) {
                    if accepts(caps) && seen.insert((index, target.line, target.character)) {
                        log::debug!(
                            target: "embedmap::worker",
                            "Teleport in {} from {:?} to {:?}",
                            document.file_name(),
                            from,
                            target
                        );
                        candidates.push(Candidate {
                            document: Arc::clone(document),
                            position: target,
                            via_teleport: true,
                        });
                        queue.push_back(target);
                    }
                }
            }
        }

        candidates
    }

    /// Run a position-based feature for `position` in source document `uri`
    ///
    /// Plain documents (no embedded tree) are passed straight to the plugins
    /// for their language. Otherwise every candidate from
    /// [`Self::resolve_candidates`] is queried with every plugin supporting its
    /// language. Raw results go through `transform` (returning `None` drops
    /// them) and are folded with `merge` in discovery order.
    pub async fn language_feature<R, T, Q, X, M>(
        &self,
        uri: &Url,
        position: Position,
        filter: FeatureFilter,
        query: Q,
        transform: X,
        merge: M,
    ) -> Option<T>
    where
        Q: Fn(Arc<dyn LanguagePlugin>, Arc<TextSnapshot>, Position) -> PluginFuture<R>,
        X: Fn(R, &QueryTarget) -> Option<T>,
        M: Fn(T, T) -> T,
    {
        let mut calls = Vec::new();

        match self.registry.get(uri) {
            Some(bundle) => {
                let candidates = self.resolve_candidates(&bundle, position, filter);
                log::debug!(
                    target: "embedmap::worker",
                    "{} candidate(s) for {} at {}:{}",
                    candidates.len(),
                    uri,
                    position.line,
                    position.character
                );
                for candidate in candidates {
                    let snapshot = Arc::clone(candidate.document.snapshot());
                    for plugin in self.plugins_for(candidate.document.language_id()) {
                        let target = QueryTarget {
                            plugin: Arc::clone(plugin),
                            document: Arc::clone(&snapshot),
                            embedded: Some(Arc::clone(&candidate.document)),
                            bundle: Some(Arc::clone(&bundle)),
                        };
                        let future =
                            query(Arc::clone(plugin), Arc::clone(&snapshot), candidate.position);
                        calls.push((target, future));
                    }
                }
            }
            None => {
                let snapshot = self.registry.store().get(uri)?;
                log::debug!(
                    target: "embedmap::worker",
                    "{} has no embedded documents, querying it directly",
                    uri
                );
                for plugin in self.plugins_for(snapshot.language_id()) {
                    let target = QueryTarget {
                        plugin: Arc::clone(plugin),
                        document: Arc::clone(&snapshot),
                        embedded: None,
                        bundle: None,
                    };
                    calls.push((target, query(Arc::clone(plugin), Arc::clone(&snapshot), position)));
                }
            }
        }

        fold_results(calls, transform, merge).await
    }

    /// Run a document-level feature for source document `uri`
    ///
    /// Every embedded file accepted by `filter` is queried as a whole; plain
    /// documents are queried directly.
    pub async fn document_feature<R, T, Q, X, M>(
        &self,
        uri: &Url,
        filter: FileFilter,
        query: Q,
        transform: X,
        merge: M,
    ) -> Option<T>
    where
        Q: Fn(Arc<dyn LanguagePlugin>, Arc<TextSnapshot>) -> PluginFuture<R>,
        X: Fn(R, &QueryTarget) -> Option<T>,
        M: Fn(T, T) -> T,
    {
        let mut calls = Vec::new();

        match self.registry.get(uri) {
            Some(bundle) => {
                for document in bundle.documents() {
                    if !filter(&document.capabilities()) {
                        continue;
                    }
                    for plugin in self.plugins_for(document.language_id()) {
                        let target = QueryTarget {
                            plugin: Arc::clone(plugin),
                            document: Arc::clone(document.snapshot()),
                            embedded: Some(Arc::clone(document)),
                            bundle: Some(Arc::clone(&bundle)),
                        };
                        calls.push((
                            target,
                            query(Arc::clone(plugin), Arc::clone(document.snapshot())),
                        ));
                    }
                }
            }
            None => {
                let snapshot = self.registry.store().get(uri)?;
                for plugin in self.plugins_for(snapshot.language_id()) {
                    let target = QueryTarget {
                        plugin: Arc::clone(plugin),
                        document: Arc::clone(&snapshot),
                        embedded: None,
                        bundle: None,
                    };
                    calls.push((target, query(Arc::clone(plugin), Arc::clone(&snapshot))));
                }
            }
        }

        fold_results(calls, transform, merge).await
    }
}

/// Await every call concurrently, then fold in call order
pub(crate) async fn fold_results<R, T, X, M>(
    calls: Vec<(QueryTarget, PluginFuture<R>)>,
    transform: X,
    merge: M,
) -> Option<T>
where
    X: Fn(R, &QueryTarget) -> Option<T>,
    M: Fn(T, T) -> T,
{
    let results = join_all(
        calls
            .into_iter()
            .map(|(target, future)| async move { (target, future.await) }),
    )
    .await;

    let mut merged: Option<T> = None;
    for (target, result) in results {
        match result {
            Ok(Some(raw)) => match transform(raw, &target) {
                Some(item) => {
                    merged = Some(match merged.take() {
                        Some(acc) => merge(acc, item),
                        None => item,
                    });
                }
                None => log::debug!(
                    target: "embedmap::worker",
                    "Dropped untraceable result of {} for {}",
                    target.plugin.name(),
                    target.document.uri()
                ),
            },
            Ok(None) => {}
            Err(err) => log::warn!(
                target: "embedmap::worker",
                "Plugin request failed for {}: {}",
                target.document.uri(),
                err
            ),
        }
    }
    merged
}

/// `merge` for list-shaped results: concatenate in order
pub fn concat<T>(mut acc: Vec<T>, items: Vec<T>) -> Vec<T> {
    acc.extend(items);
    acc
}
