use std::sync::atomic::{AtomicU64, Ordering};

use tower_lsp_server::ls_types::{Position, Range};
use url::Url;

use crate::mapping::MappingRange;
use crate::text::LineIndex;

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of one snapshot
///
/// Two snapshots with identical text still get distinct tokens; caches keyed
/// by token can therefore never serve a bundle built for other text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SnapshotToken(u64);

impl SnapshotToken {
    fn next() -> Self {
        Self(NEXT_TOKEN.fetch_add(1, Ordering::Relaxed))
    }
}

/// Immutable, versioned text of one document
///
/// Deliberately not `Clone`: identity is the token, shared through `Arc`.
#[derive(Debug)]
pub struct TextSnapshot {
    uri: Url,
    language_id: String,
    version: i32,
    text: String,
    line_index: LineIndex,
    token: SnapshotToken,
}

impl TextSnapshot {
    pub fn new(uri: Url, language_id: impl Into<String>, version: i32, text: String) -> Self {
        let line_index = LineIndex::new(&text);
        Self {
            uri,
            language_id: language_id.into(),
            version,
            text,
            line_index,
            token: SnapshotToken::next(),
        }
    }

    pub fn uri(&self) -> &Url {
        &self.uri
    }

    pub fn language_id(&self) -> &str {
        &self.language_id
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn token(&self) -> SnapshotToken {
        self.token
    }

    /// Text covered by a byte range, if it lies on character boundaries
    pub fn slice(&self, range: MappingRange) -> Option<&str> {
        self.text.get(range.start..range.end)
    }

    pub fn offset_at(&self, position: Position) -> Option<usize> {
        self.line_index.position_to_offset(&self.text, position)
    }

    pub fn position_at(&self, offset: usize) -> Option<Position> {
        self.line_index.offset_to_position(&self.text, offset)
    }

    pub fn range_to_offsets(&self, range: Range) -> Option<MappingRange> {
        Some(MappingRange::new(
            self.offset_at(range.start)?,
            self.offset_at(range.end)?,
        ))
    }

    pub fn offsets_to_range(&self, range: MappingRange) -> Option<Range> {
        self.line_index
            .offsets_to_range(&self.text, range.start, range.end)
    }
}
