//! URIs of embedded documents.
//!
//! For most source URIs (file://, https://, etc.) the embedded document lives
//! next to its source: the last path segment is replaced by the embedded file
//! name, so plugins resolving relative imports or project configuration see
//! the source's directory. For "cannot-be-a-base" URIs (untitled:, data:) an
//! `embedmap:` URI with the percent-encoded source is used instead.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use url::Url;

/// Characters kept verbatim in the fallback file-name segment
const FILE_NAME_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'.').remove(b'-').remove(b'_');

/// Address of one embedded document derived from its source URI and file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedDocumentUri {
    source_uri: Url,
    file_name: String,
}

impl EmbeddedDocumentUri {
    /// # Panics (debug builds only)
    /// Panics if `file_name` is empty.
    pub fn new(source_uri: &Url, file_name: &str) -> Self {
        debug_assert!(!file_name.is_empty(), "file_name must not be empty");

        Self {
            source_uri: source_uri.clone(),
            file_name: file_name.to_string(),
        }
    }

    pub fn source_uri(&self) -> &Url {
        &self.source_uri
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Build the URL.
    ///
    /// Format: `{scheme}://{source_dir}/{file_name}`, or
    /// `embedmap:///virtual/{encoded_source}/{file_name}` for sources that
    /// cannot be a base.
    pub fn to_url(&self) -> Option<Url> {
        let mut url = self.source_uri.clone();
        // path_segments_mut() returns Err for cannot-be-a-base URIs
        let modified = url
            .path_segments_mut()
            .map(|mut segments| {
                segments.pop();
                segments.push(&self.file_name);
            })
            .is_ok();

        if modified {
            return Some(url);
        }

        let encoded_source = utf8_percent_encode(self.source_uri.as_str(), NON_ALPHANUMERIC);
        let encoded_name = utf8_percent_encode(&self.file_name, FILE_NAME_SET);
        Url::parse(&format!(
            "embedmap:///virtual/{encoded_source}/{encoded_name}"
        ))
        .ok()
    }

    /// ASCII case-insensitive comparison of two document URIs
    pub fn same_document(a: &Url, b: &Url) -> bool {
        a.as_str().eq_ignore_ascii_case(b.as_str())
    }

    /// Key under which embedded documents are indexed
    pub(crate) fn index_key(uri: &Url) -> String {
        uri.as_str().to_ascii_lowercase()
    }
}
