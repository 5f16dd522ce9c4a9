//! Feature aggregation over embedded documents.
//!
//! [`FeatureWorker`] resolves which embedded documents a source request
//! reaches, queries every capable plugin, translates the results back to
//! source coordinates and merges them. The concrete features live in their
//! own modules as methods on the worker.

pub mod call_hierarchy;
pub mod dedupe;
pub mod definition;
pub mod diagnostics;
pub mod hover;
pub mod references;
pub mod transform;
pub mod worker;

pub use call_hierarchy::CallHierarchyData;
pub use worker::{
    Candidate, CapabilityFilter, FeatureFilter, FeatureWorker, FileFilter, PluginFuture,
    QueryTarget, TeleportFilter,
};
