use std::sync::Arc;

use dashmap::DashMap;
use url::Url;

use super::TextSnapshot;

/// The current snapshot of every open source document.
///
/// Every `open`/`update` installs a fresh `Arc<TextSnapshot>`; holders of an
/// older snapshot keep reading consistent text.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: DashMap<Url, Arc<TextSnapshot>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(
        &self,
        uri: Url,
        language_id: impl Into<String>,
        version: i32,
        text: String,
    ) -> Arc<TextSnapshot> {
        let snapshot = Arc::new(TextSnapshot::new(uri.clone(), language_id, version, text));
        self.documents.insert(uri, Arc::clone(&snapshot));
        snapshot
    }

    /// Replace the text of a document, keeping its language id.
    ///
    /// Returns `None` if the document is not open.
    pub fn update(&self, uri: &Url, version: i32, text: String) -> Option<Arc<TextSnapshot>> {
        let mut entry = self.documents.get_mut(uri)?;
        let snapshot = Arc::new(TextSnapshot::new(
            uri.clone(),
            entry.language_id(),
            version,
            text,
        ));
        *entry = Arc::clone(&snapshot);
        Some(snapshot)
    }

    pub fn get(&self, uri: &Url) -> Option<Arc<TextSnapshot>> {
        self.documents.get(uri).map(|entry| Arc::clone(entry.value()))
    }

    pub fn close(&self, uri: &Url) -> Option<Arc<TextSnapshot>> {
        self.documents.remove(uri).map(|(_, snapshot)| snapshot)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
