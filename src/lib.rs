pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod features;
pub mod mapping;
pub mod plugin;
pub mod text;

pub use config::{EmbedSettings, SettingsLoadOutcome, load_settings};
pub use document::{DocumentStore, SnapshotToken, TextSnapshot};
pub use embedding::{
    DocumentRegistry, EmbeddedDocument, EmbeddedDocumentUri, EmbeddedDocuments,
    EmbeddingProvider, StaticEmbeddingProvider, VirtualFile,
};
pub use error::{EmbedError, EmbedResult, PluginError, PluginResult};
pub use features::FeatureWorker;
pub use mapping::{
    Bias, DocumentSourceMap, DocumentTeleportMap, Mapping, MappingCapabilities, MappingRange,
    SourceMap, TeleportCapabilities, TeleportMap, TeleportMapping, accept_all,
};
pub use plugin::LanguagePlugin;
