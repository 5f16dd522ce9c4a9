//! Shared fixtures for integration tests: a scripted plugin and a small
//! two-embed document.
#![allow(dead_code)]

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use embedmap::config::FeatureSettings;
use embedmap::{
    DocumentRegistry, DocumentStore, EmbeddingProvider, FeatureWorker, LanguagePlugin, Mapping,
    MappingCapabilities, MappingRange, PluginError, PluginResult, StaticEmbeddingProvider,
    TeleportCapabilities, TeleportMapping, TextSnapshot, VirtualFile,
};
use tower_lsp_server::ls_types::{
    CallHierarchyIncomingCall, CallHierarchyItem, CallHierarchyOutgoingCall, Diagnostic, Hover,
    Location, LocationLink, Position, Range, SymbolKind, Uri,
};
use url::Url;

pub const APP_URI: &str = "file:///project/App.vue";
pub const SCRIPT_URI: &str = "file:///project/App.vue.script.ts";
pub const TEMPLATE_URI: &str = "file:///project/App.vue.template.ts";

pub fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

pub fn lsp_uri(s: &str) -> Uri {
    Uri::from_str(s).unwrap()
}

pub fn pos(line: u32, character: u32) -> Position {
    Position::new(line, character)
}

pub fn range(sl: u32, sc: u32, el: u32, ec: u32) -> Range {
    Range::new(pos(sl, sc), pos(el, ec))
}

pub fn location(uri: &str, r: Range) -> Location {
    Location {
        uri: lsp_uri(uri),
        range: r,
    }
}

pub fn call_item(name: &str, uri: &str, r: Range) -> CallHierarchyItem {
    CallHierarchyItem {
        name: name.to_string(),
        kind: SymbolKind::FUNCTION,
        tags: None,
        detail: None,
        uri: lsp_uri(uri),
        range: r,
        selection_range: r,
        data: None,
    }
}

/// Source `f();` split into an html root with two TypeScript children.
///
/// - `App.vue.script.ts` is `f();`, mapped 1:1.
/// - `App.vue.template.ts` is `import { f } from './s';\nf();`; the source
///   maps onto its second line, and a teleport links that `f` (offset 25)
///   with the imported binding (offset 9).
pub fn two_embed_tree() -> VirtualFile {
    VirtualFile::new(
        "App.vue.html",
        "html",
        "f();",
        vec![Mapping::new(0..4, 0..4, MappingCapabilities::full())],
    )
    .with_embedded(VirtualFile::new(
        "App.vue.script.ts",
        "typescript",
        "f();",
        vec![Mapping::new(0..4, 0..4, MappingCapabilities::full())],
    ))
    .with_embedded(
        VirtualFile::new(
            "App.vue.template.ts",
            "typescript",
            "import { f } from './s';\nf();",
            vec![Mapping::new(0..4, 25..29, MappingCapabilities::full())],
        )
        .with_teleports(vec![TeleportMapping {
            range_a: MappingRange::new(25, 26),
            range_b: MappingRange::new(9, 10),
            a_to_b: TeleportCapabilities::full(),
            b_to_a: TeleportCapabilities::full(),
        }]),
    )
}

/// Everything a feature test needs, wired together
pub struct Harness {
    pub store: Arc<DocumentStore>,
    pub provider: Arc<StaticEmbeddingProvider>,
    pub worker: FeatureWorker,
}

impl Harness {
    pub fn new(plugins: Vec<Arc<FakePlugin>>, settings: FeatureSettings) -> Self {
        let store = Arc::new(DocumentStore::new());
        let provider = Arc::new(StaticEmbeddingProvider::new());
        let registry = Arc::new(DocumentRegistry::new(
            Arc::clone(&store),
            Arc::clone(&provider) as Arc<dyn EmbeddingProvider>,
            8,
        ));
        let worker = plugins
            .into_iter()
            .fold(FeatureWorker::new(registry, settings), |worker, plugin| {
                worker.with_plugin(plugin as Arc<dyn LanguagePlugin>)
            });
        Self {
            store,
            provider,
            worker,
        }
    }

    /// Open `uri` with `text`, embedding `tree` into it when given
    pub fn open(&self, uri: &str, language_id: &str, text: &str, tree: Option<VirtualFile>) {
        if let Some(tree) = tree {
            self.provider.insert(url(uri), tree);
        }
        self.store
            .open(url(uri), language_id, 1, text.to_string());
    }
}

/// Scripted plugin: answers are keyed by the URI of the queried document
#[derive(Default)]
pub struct FakePlugin {
    name: String,
    languages: Vec<String>,
    failing: bool,
    hovers: HashMap<String, Hover>,
    references: HashMap<String, Vec<Location>>,
    definitions: HashMap<String, Vec<LocationLink>>,
    call_items: HashMap<String, Vec<CallHierarchyItem>>,
    incoming: HashMap<String, Vec<CallHierarchyIncomingCall>>,
    outgoing: HashMap<String, Vec<CallHierarchyOutgoingCall>>,
    diagnostics: HashMap<String, Vec<Diagnostic>>,
    queries: Mutex<Vec<(String, Position)>>,
}

impl FakePlugin {
    pub fn new(name: &str, languages: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            languages: languages.iter().map(|l| l.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn with_hover(mut self, uri: &str, hover: Hover) -> Self {
        self.hovers.insert(uri.to_string(), hover);
        self
    }

    pub fn with_references(mut self, uri: &str, locations: Vec<Location>) -> Self {
        self.references.insert(uri.to_string(), locations);
        self
    }

    pub fn with_definitions(mut self, uri: &str, links: Vec<LocationLink>) -> Self {
        self.definitions.insert(uri.to_string(), links);
        self
    }

    pub fn with_call_items(mut self, uri: &str, items: Vec<CallHierarchyItem>) -> Self {
        self.call_items.insert(uri.to_string(), items);
        self
    }

    /// Incoming calls answered for items located in `uri`
    pub fn with_incoming(mut self, uri: &str, calls: Vec<CallHierarchyIncomingCall>) -> Self {
        self.incoming.insert(uri.to_string(), calls);
        self
    }

    /// Outgoing calls answered for items located in `uri`
    pub fn with_outgoing(mut self, uri: &str, calls: Vec<CallHierarchyOutgoingCall>) -> Self {
        self.outgoing.insert(uri.to_string(), calls);
        self
    }

    pub fn with_diagnostics(mut self, uri: &str, diagnostics: Vec<Diagnostic>) -> Self {
        self.diagnostics.insert(uri.to_string(), diagnostics);
        self
    }

    /// Every `(document uri, position)` this plugin was queried with
    pub fn queries(&self) -> Vec<(String, Position)> {
        self.queries.lock().unwrap().clone()
    }

    fn record(&self, document: &TextSnapshot, position: Position) -> PluginResult<String> {
        self.queries
            .lock()
            .unwrap()
            .push((document.uri().to_string(), position));
        if self.failing {
            return Err(PluginError::failed(&self.name, "scripted failure"));
        }
        Ok(document.uri().to_string())
    }
}

#[async_trait]
impl LanguagePlugin for FakePlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports_language(&self, language_id: &str) -> bool {
        self.languages.iter().any(|l| l == language_id)
    }

    async fn hover(
        &self,
        document: Arc<TextSnapshot>,
        position: Position,
    ) -> PluginResult<Option<Hover>> {
        let uri = self.record(&document, position)?;
        Ok(self.hovers.get(&uri).cloned())
    }

    async fn definition(
        &self,
        document: Arc<TextSnapshot>,
        position: Position,
    ) -> PluginResult<Option<Vec<LocationLink>>> {
        let uri = self.record(&document, position)?;
        Ok(self.definitions.get(&uri).cloned())
    }

    async fn references(
        &self,
        document: Arc<TextSnapshot>,
        position: Position,
    ) -> PluginResult<Option<Vec<Location>>> {
        let uri = self.record(&document, position)?;
        Ok(self.references.get(&uri).cloned())
    }

    async fn prepare_call_hierarchy(
        &self,
        document: Arc<TextSnapshot>,
        position: Position,
    ) -> PluginResult<Option<Vec<CallHierarchyItem>>> {
        let uri = self.record(&document, position)?;
        Ok(self.call_items.get(&uri).cloned())
    }

    async fn incoming_calls(
        &self,
        item: CallHierarchyItem,
    ) -> PluginResult<Option<Vec<CallHierarchyIncomingCall>>> {
        Ok(self.incoming.get(item.uri.as_str()).cloned())
    }

    async fn outgoing_calls(
        &self,
        item: CallHierarchyItem,
    ) -> PluginResult<Option<Vec<CallHierarchyOutgoingCall>>> {
        Ok(self.outgoing.get(item.uri.as_str()).cloned())
    }

    async fn diagnostics(
        &self,
        document: Arc<TextSnapshot>,
    ) -> PluginResult<Option<Vec<Diagnostic>>> {
        let uri = self.record(&document, pos(0, 0))?;
        Ok(self.diagnostics.get(&uri).cloned())
    }
}
