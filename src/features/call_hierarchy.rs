//! Call hierarchy across embedded documents.
//!
//! Items handed to the client carry, in `data`, every plugin and original
//! embedded item they were derived from. Follow-up requests use those origins
//! to reach the same plugins with the items those plugins produced, then merge
//! the answers. Calls found through several embedded documents keep the call
//! sites of all of them.

use std::collections::HashMap;
use std::sync::Arc;

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tower_lsp_server::ls_types::{
    CallHierarchyIncomingCall, CallHierarchyItem, CallHierarchyOutgoingCall, Position, Range, Uri,
};
use url::Url;

use super::dedupe::{
    item_key, with_call_hierarchy_incoming_calls, with_call_hierarchy_outgoing_calls,
};
use super::transform::{SourceTranslator, uri_to_url, url_to_uri};
use super::worker::{
    FeatureFilter, FeatureWorker, PluginFuture, QueryTarget, TeleportFilter, concat, fold_results,
};
use crate::mapping::{MappingCapabilities, TeleportCapabilities};
use crate::plugin::LanguagePlugin;

const CALL_HIERARCHY_FILTER: FeatureFilter = FeatureFilter {
    mapping: |caps: &MappingCapabilities| caps.references,
    teleport: Some((|caps: &TeleportCapabilities| caps.references) as TeleportFilter),
};

/// One plugin-side item a client item was derived from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallHierarchyOrigin {
    pub plugin: String,
    pub item: CallHierarchyItem,
}

/// Payload stored in `CallHierarchyItem::data` of translated items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallHierarchyData {
    pub origins: Vec<CallHierarchyOrigin>,
}

impl CallHierarchyData {
    pub fn from_item(item: &CallHierarchyItem) -> Option<Self> {
        serde_json::from_value(item.data.clone()?).ok()
    }

    fn attach_to(&self, item: &mut CallHierarchyItem) {
        item.data = serde_json::to_value(self).ok();
    }

    fn union(&mut self, other: CallHierarchyData) {
        for origin in other.origins {
            if !self.origins.contains(&origin) {
                self.origins.push(origin);
            }
        }
    }
}

impl FeatureWorker {
    pub async fn prepare_call_hierarchy(
        &self,
        uri: &Url,
        position: Position,
    ) -> Option<Vec<CallHierarchyItem>> {
        let translator = SourceTranslator::new(self.registry(), CALL_HIERARCHY_FILTER.mapping);

        let items = self
            .language_feature(
                uri,
                position,
                CALL_HIERARCHY_FILTER,
                |plugin, document, position| {
                    async move { plugin.prepare_call_hierarchy(document, position).await }.boxed()
                },
                |items: Vec<CallHierarchyItem>, target| {
                    Some(
                        items
                            .into_iter()
                            .filter_map(|item| {
                                translate_item(&translator, item, target)
                            })
                            .collect::<Vec<_>>(),
                    )
                },
                concat,
            )
            .await?;

        Some(with_call_hierarchy_items(items))
    }

    /// Callers of `item`, an item returned by [`Self::prepare_call_hierarchy`]
    pub async fn incoming_calls(
        &self,
        item: &CallHierarchyItem,
    ) -> Option<Vec<CallHierarchyIncomingCall>> {
        let translator = SourceTranslator::new(self.registry(), CALL_HIERARCHY_FILTER.mapping);
        let calls = self.origin_calls(item, |plugin, original| {
            async move { plugin.incoming_calls(original).await }.boxed()
        });

        let calls = fold_results(
            calls,
            |calls: Vec<CallHierarchyIncomingCall>, target| {
                Some(
                    calls
                        .into_iter()
                        .filter_map(|call| {
                            // Call sites lie in the caller
                            let from_ranges =
                                translate_ranges(&translator, &call.from.uri, call.from_ranges, target)?;
                            let from = translate_item(&translator, call.from, target)?;
                            Some(CallHierarchyIncomingCall { from, from_ranges })
                        })
                        .collect::<Vec<_>>(),
                )
            },
            concat,
        )
        .await?;

        Some(with_call_hierarchy_incoming_calls(calls))
    }

    /// Callees of `item`, an item returned by [`Self::prepare_call_hierarchy`]
    pub async fn outgoing_calls(
        &self,
        item: &CallHierarchyItem,
    ) -> Option<Vec<CallHierarchyOutgoingCall>> {
        let translator = SourceTranslator::new(self.registry(), CALL_HIERARCHY_FILTER.mapping);
        let calls = self.origin_calls(item, |plugin, original| {
            async move { plugin.outgoing_calls(original).await }.boxed()
        });

        let calls = fold_results(
            calls,
            |calls: Vec<CallHierarchyOutgoingCall>, target| {
                let caller = url_to_uri(target.document.uri())?;
                Some(
                    calls
                        .into_iter()
                        .filter_map(|call| {
                            // Call sites lie in the item the request was made for
                            let from_ranges =
                                translate_ranges(&translator, &caller, call.from_ranges, target)?;
                            let to = translate_item(&translator, call.to, target)?;
                            Some(CallHierarchyOutgoingCall { to, from_ranges })
                        })
                        .collect::<Vec<_>>(),
                )
            },
            concat,
        )
        .await?;

        Some(with_call_hierarchy_outgoing_calls(calls))
    }

    /// One pending call per origin of `item` whose plugin and document are still known
    fn origin_calls<R, Q>(
        &self,
        item: &CallHierarchyItem,
        query: Q,
    ) -> Vec<(QueryTarget, PluginFuture<R>)>
    where
        Q: Fn(Arc<dyn LanguagePlugin>, CallHierarchyItem) -> PluginFuture<R>,
    {
        let Some(data) = CallHierarchyData::from_item(item) else {
            log::debug!(
                target: "embedmap::call_hierarchy",
                "Call hierarchy item {} carries no origin",
                item.name
            );
            return Vec::new();
        };

        data.origins
            .into_iter()
            .filter_map(|origin| {
                let Some(plugin) = self.plugin(&origin.plugin) else {
                    log::warn!(
                        target: "embedmap::call_hierarchy",
                        "Unknown plugin {} in call hierarchy item",
                        origin.plugin
                    );
                    return None;
                };
                let target = self.target_for(plugin, &origin.item.uri)?;
                Some((target, query(Arc::clone(plugin), origin.item)))
            })
            .collect()
    }

    fn target_for(
        &self,
        plugin: &Arc<dyn LanguagePlugin>,
        uri: &Uri,
    ) -> Option<QueryTarget> {
        let url = uri_to_url(uri)?;
        let (document, embedded, bundle) = match self.registry().get_embedded_with_bundle(&url) {
            Some((bundle, embedded)) => {
                (Arc::clone(embedded.snapshot()), Some(embedded), Some(bundle))
            }
            None => (self.registry().store().get(&url)?, None, None),
        };
        Some(QueryTarget {
            plugin: Arc::clone(plugin),
            document,
            embedded,
            bundle,
        })
    }
}

/// Translate an item to source coordinates and record where it came from
fn translate_item(
    translator: &SourceTranslator<'_>,
    item: CallHierarchyItem,
    target: &QueryTarget,
) -> Option<CallHierarchyItem> {
    let (uri, range, selection_range) =
        translator.range_pair(&item.uri, item.range, item.selection_range, target)?;
    let data = CallHierarchyData {
        origins: vec![CallHierarchyOrigin {
            plugin: target.plugin.name().to_string(),
            item: item.clone(),
        }],
    };
    let mut translated = CallHierarchyItem {
        uri,
        range,
        selection_range,
        ..item
    };
    data.attach_to(&mut translated);
    Some(translated)
}

/// Translate call sites; `None` when there were some and none survived
fn translate_ranges(
    translator: &SourceTranslator<'_>,
    uri: &Uri,
    ranges: Vec<Range>,
    target: &QueryTarget,
) -> Option<Vec<Range>> {
    let had_ranges = !ranges.is_empty();
    let translated: Vec<Range> = ranges
        .into_iter()
        .filter_map(|range| translator.range(uri, range, target).map(|(_, range)| range))
        .collect();
    (!had_ranges || !translated.is_empty()).then_some(translated)
}

/// Collapse location-equal items, unioning their origins
pub fn with_call_hierarchy_items(items: Vec<CallHierarchyItem>) -> Vec<CallHierarchyItem> {
    let mut index = HashMap::new();
    let mut merged: Vec<CallHierarchyItem> = Vec::new();

    for item in items {
        match index.get(&item_key(&item)) {
            Some(&position) => {
                let existing: &mut CallHierarchyItem = &mut merged[position];
                if let (Some(mut data), Some(extra)) = (
                    CallHierarchyData::from_item(existing),
                    CallHierarchyData::from_item(&item),
                ) {
                    data.union(extra);
                    data.attach_to(existing);
                }
            }
            None => {
                index.insert(item_key(&item), merged.len());
                merged.push(item);
            }
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use tower_lsp_server::ls_types::SymbolKind;

    fn item(uri: &str, line: u32) -> CallHierarchyItem {
        let range = Range::new(Position::new(line, 0), Position::new(line, 3));
        CallHierarchyItem {
            name: "f".to_string(),
            kind: SymbolKind::FUNCTION,
            tags: None,
            detail: None,
            uri: Uri::from_str(uri).unwrap(),
            range,
            selection_range: range,
            data: None,
        }
    }

    fn with_origin(
        mut translated: CallHierarchyItem,
        plugin: &str,
        original: CallHierarchyItem,
    ) -> CallHierarchyItem {
        CallHierarchyData {
            origins: vec![CallHierarchyOrigin {
                plugin: plugin.to_string(),
                item: original,
            }],
        }
        .attach_to(&mut translated);
        translated
    }

    #[test]
    fn test_items_at_one_location_union_origins() {
        let source = item("file:///project/App.vue", 2);
        let from_script = item("file:///project/App.vue.script.ts", 0);
        let from_template = item("file:///project/App.vue.template.ts", 5);

        let merged = with_call_hierarchy_items(vec![
            with_origin(source.clone(), "ts", from_script.clone()),
            with_origin(source.clone(), "ts", from_template.clone()),
            with_origin(source.clone(), "ts", from_script.clone()),
        ]);

        assert_eq!(merged.len(), 1);
        let data = CallHierarchyData::from_item(&merged[0]).unwrap();
        let originals: Vec<&CallHierarchyItem> =
            data.origins.iter().map(|origin| &origin.item).collect();
        assert_eq!(originals, vec![&from_script, &from_template]);
    }

    #[test]
    fn test_item_without_data_has_no_origin() {
        assert!(CallHierarchyData::from_item(&item("file:///a.ts", 0)).is_none());
    }
}
