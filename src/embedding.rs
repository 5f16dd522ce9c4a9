//! Embedded documents: the virtual file tree a provider derives from a source
//! document, the URIs those files are addressed by, and the registry that
//! builds and caches their source maps per snapshot.

pub mod provider;
pub mod registry;
pub mod virtual_file;
pub mod virtual_uri;

pub use provider::{EmbeddingProvider, StaticEmbeddingProvider};
pub use registry::{DocumentRegistry, EmbeddedDocument, EmbeddedDocuments};
pub use virtual_file::VirtualFile;
pub use virtual_uri::EmbeddedDocumentUri;
