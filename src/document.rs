//! Immutable document snapshots and the store of open source documents.

pub mod snapshot;
pub mod store;

pub use snapshot::{SnapshotToken, TextSnapshot};
pub use store::DocumentStore;
