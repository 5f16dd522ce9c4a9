//! Source maps between a source document and documents generated from it.
//!
//! The offset-level types ([`SourceMap`], [`TeleportMap`]) only do range
//! arithmetic; per-entry metadata is an opaque generic payload consulted by
//! caller-supplied filters. The document-level wrappers bind a table to a
//! fixed pair of [`TextSnapshot`](crate::document::TextSnapshot)s and speak
//! LSP positions.

pub mod capabilities;
pub mod document_map;
pub mod range;
pub mod source_map;
pub mod teleport;

pub use capabilities::{FileCapabilities, MappingCapabilities, Narrow, TeleportCapabilities};
pub use document_map::{DocumentSourceMap, DocumentTeleportMap};
pub use range::{Bias, Mapping, MappingRange};
pub use source_map::{SourceMap, accept_all};
pub use teleport::{TeleportData, TeleportMap, TeleportMapping};
