use futures::FutureExt;
use tower_lsp_server::ls_types::{LocationLink, Position};
use url::Url;

use super::dedupe::with_location_links;
use super::transform::SourceTranslator;
use super::worker::{FeatureFilter, FeatureWorker, TeleportFilter, concat};
use crate::mapping::{MappingCapabilities, TeleportCapabilities};

const DEFINITION_FILTER: FeatureFilter = FeatureFilter {
    mapping: |caps: &MappingCapabilities| caps.definition,
    teleport: Some((|caps: &TeleportCapabilities| caps.definition) as TeleportFilter),
};

impl FeatureWorker {
    /// Definitions of the symbol at `position` of source document `uri`
    pub async fn definition(&self, uri: &Url, position: Position) -> Option<Vec<LocationLink>> {
        let translator = SourceTranslator::new(self.registry(), DEFINITION_FILTER.mapping);

        let links = self
            .language_feature(
                uri,
                position,
                DEFINITION_FILTER,
                |plugin, document, position| {
                    async move { plugin.definition(document, position).await }.boxed()
                },
                |links: Vec<LocationLink>, target| {
                    Some(
                        links
                            .into_iter()
                            .filter_map(|link| translator.location_link(link, target))
                            .collect::<Vec<_>>(),
                    )
                },
                concat,
            )
            .await?;

        Some(with_location_links(links))
    }
}
