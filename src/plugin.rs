//! The seam to language-specific analysis plugins.
//!
//! A plugin answers queries about one document in that document's own
//! coordinates. It never sees the source document of an embedded file; the
//! feature layer translates positions in and results out.

use std::sync::Arc;

use async_trait::async_trait;
use tower_lsp_server::ls_types::{
    CallHierarchyIncomingCall, CallHierarchyItem, CallHierarchyOutgoingCall, Diagnostic, Hover,
    Location, LocationLink, Position,
};

use crate::document::TextSnapshot;
use crate::error::PluginResult;

/// Analysis backend for one or more languages
///
/// Every query defaults to `Ok(None)`, meaning "nothing to say". Returning an
/// error is logged by the caller and otherwise treated the same way.
#[async_trait]
pub trait LanguagePlugin: Send + Sync {
    /// Stable name, used to route call-hierarchy follow-ups back to this plugin
    fn name(&self) -> &str;

    fn supports_language(&self, language_id: &str) -> bool;

    async fn hover(
        &self,
        _document: Arc<TextSnapshot>,
        _position: Position,
    ) -> PluginResult<Option<Hover>> {
        Ok(None)
    }

    async fn definition(
        &self,
        _document: Arc<TextSnapshot>,
        _position: Position,
    ) -> PluginResult<Option<Vec<LocationLink>>> {
        Ok(None)
    }

    async fn references(
        &self,
        _document: Arc<TextSnapshot>,
        _position: Position,
    ) -> PluginResult<Option<Vec<Location>>> {
        Ok(None)
    }

    async fn prepare_call_hierarchy(
        &self,
        _document: Arc<TextSnapshot>,
        _position: Position,
    ) -> PluginResult<Option<Vec<CallHierarchyItem>>> {
        Ok(None)
    }

    /// Callers of `item`, an item this plugin returned earlier
    async fn incoming_calls(
        &self,
        _item: CallHierarchyItem,
    ) -> PluginResult<Option<Vec<CallHierarchyIncomingCall>>> {
        Ok(None)
    }

    /// Callees of `item`, an item this plugin returned earlier
    async fn outgoing_calls(
        &self,
        _item: CallHierarchyItem,
    ) -> PluginResult<Option<Vec<CallHierarchyOutgoingCall>>> {
        Ok(None)
    }

    async fn diagnostics(
        &self,
        _document: Arc<TextSnapshot>,
    ) -> PluginResult<Option<Vec<Diagnostic>>> {
        Ok(None)
    }
}
