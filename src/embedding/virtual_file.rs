use serde::{Deserialize, Serialize};

use crate::mapping::{
    FileCapabilities, Mapping, MappingCapabilities, TeleportCapabilities, TeleportMapping,
};

/// One node of the virtual file tree produced by an embedding provider
///
/// The root's mappings relate it to the source document; every nested file's
/// mappings relate it to its parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualFile<D = MappingCapabilities, C = TeleportCapabilities> {
    /// File name of the embedded document, unique within one source document
    pub file_name: String,
    pub language_id: String,
    pub text: String,
    #[serde(default)]
    pub mappings: Vec<Mapping<D>>,
    #[serde(default)]
    pub teleports: Vec<TeleportMapping<C>>,
    #[serde(default)]
    pub capabilities: FileCapabilities,
    #[serde(default)]
    pub embedded_files: Vec<VirtualFile<D, C>>,
}

impl<D, C> VirtualFile<D, C> {
    pub fn new(
        file_name: impl Into<String>,
        language_id: impl Into<String>,
        text: impl Into<String>,
        mappings: Vec<Mapping<D>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            language_id: language_id.into(),
            text: text.into(),
            mappings,
            teleports: Vec::new(),
            capabilities: FileCapabilities::default(),
            embedded_files: Vec::new(),
        }
    }

    pub fn with_teleports(mut self, teleports: Vec<TeleportMapping<C>>) -> Self {
        self.teleports = teleports;
        self
    }

    pub fn with_capabilities(mut self, capabilities: FileCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_embedded(mut self, child: VirtualFile<D, C>) -> Self {
        self.embedded_files.push(child);
        self
    }

    /// Pre-order walk over this file and all nested files, with their depth
    pub fn walk(&self) -> impl Iterator<Item = (usize, &VirtualFile<D, C>)> {
        let mut stack = vec![(0, self)];
        std::iter::from_fn(move || {
            let (depth, file) = stack.pop()?;
            stack.extend(
                file.embedded_files
                    .iter()
                    .rev()
                    .map(|child| (depth + 1, child)),
            );
            Some((depth, file))
        })
    }

    /// Find a file in this tree by name (ASCII case-insensitive)
    pub fn find(&self, file_name: &str) -> Option<&VirtualFile<D, C>> {
        self.walk()
            .map(|(_, file)| file)
            .find(|file| file.file_name.eq_ignore_ascii_case(file_name))
    }
}
