//! Duplicate removal for merged feature results.
//!
//! The same logical result is often reported once per embedded document (a
//! symbol reachable directly and through a teleport, say). Items are equal
//! when they point at the same `(uri, start, end)`; the first occurrence wins
//! and keeps its position in the output.

use std::collections::HashMap;
use std::collections::HashSet;
use std::hash::Hash;

use tower_lsp_server::ls_types::{
    CallHierarchyIncomingCall, CallHierarchyItem, CallHierarchyOutgoingCall, Diagnostic, Location,
    LocationLink, Range, Uri,
};

/// `(uri, (start line, start column), (end line, end column))`
pub type LocationKey = (String, (u32, u32), (u32, u32));

pub fn location_key(uri: &Uri, range: &Range) -> LocationKey {
    (uri.as_str().to_string(), range_key(range).0, range_key(range).1)
}

fn range_key(range: &Range) -> ((u32, u32), (u32, u32)) {
    (
        (range.start.line, range.start.character),
        (range.end.line, range.end.character),
    )
}

/// Keep the first item per key, preserving first-occurrence order
pub fn dedupe_by_key<T, K, F>(items: Vec<T>, key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(key(item)))
        .collect()
}

pub fn with_locations(items: Vec<Location>) -> Vec<Location> {
    dedupe_by_key(items, |location| {
        location_key(&location.uri, &location.range)
    })
}

/// Links are equal when they select the same target
pub fn with_location_links(items: Vec<LocationLink>) -> Vec<LocationLink> {
    dedupe_by_key(items, |link| {
        location_key(&link.target_uri, &link.target_selection_range)
    })
}

pub fn with_call_hierarchy_incoming_calls(
    calls: Vec<CallHierarchyIncomingCall>,
) -> Vec<CallHierarchyIncomingCall> {
    union_calls(
        calls,
        |call| item_key(&call.from),
        |call| &mut call.from_ranges,
    )
}

pub fn with_call_hierarchy_outgoing_calls(
    calls: Vec<CallHierarchyOutgoingCall>,
) -> Vec<CallHierarchyOutgoingCall> {
    union_calls(calls, |call| item_key(&call.to), |call| &mut call.from_ranges)
}

/// Diagnostics are equal when range, severity, code, source and message match
pub fn with_diagnostics(items: Vec<Diagnostic>) -> Vec<Diagnostic> {
    dedupe_by_key(items, |diagnostic| {
        (
            range_key(&diagnostic.range),
            format!("{:?}", diagnostic.severity),
            format!("{:?}", diagnostic.code),
            diagnostic.source.clone(),
            diagnostic.message.clone(),
        )
    })
}

pub(crate) fn item_key(item: &CallHierarchyItem) -> LocationKey {
    location_key(&item.uri, &item.selection_range)
}

/// Collapse location-equal calls, unioning their call-site ranges
///
/// The merged range list is duplicate-free and sorted in source order.
fn union_calls<T, K, R>(calls: Vec<T>, key: K, mut ranges: R) -> Vec<T>
where
    K: Fn(&T) -> LocationKey,
    R: FnMut(&mut T) -> &mut Vec<Range>,
{
    let mut index: HashMap<LocationKey, usize> = HashMap::new();
    let mut merged: Vec<T> = Vec::new();

    for mut call in calls {
        match index.get(&key(&call)) {
            Some(&position) => {
                let extra = std::mem::take(ranges(&mut call));
                ranges(&mut merged[position]).extend(extra);
            }
            None => {
                index.insert(key(&call), merged.len());
                merged.push(call);
            }
        }
    }

    for call in &mut merged {
        let from_ranges = ranges(call);
        from_ranges.sort_by_key(range_key);
        from_ranges.dedup();
    }
    merged
}
