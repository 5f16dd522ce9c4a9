use futures::FutureExt;
use tower_lsp_server::ls_types::{Location, Position};
use url::Url;

use super::dedupe::with_locations;
use super::transform::SourceTranslator;
use super::worker::{FeatureFilter, FeatureWorker, TeleportFilter, concat};
use crate::mapping::{MappingCapabilities, TeleportCapabilities};

const REFERENCES_FILTER: FeatureFilter = FeatureFilter {
    mapping: |caps: &MappingCapabilities| caps.references,
    teleport: Some((|caps: &TeleportCapabilities| caps.references) as TeleportFilter),
};

impl FeatureWorker {
    /// References to the symbol at `position` of source document `uri`
    pub async fn references(&self, uri: &Url, position: Position) -> Option<Vec<Location>> {
        let translator = SourceTranslator::new(self.registry(), REFERENCES_FILTER.mapping);

        let locations = self
            .language_feature(
                uri,
                position,
                REFERENCES_FILTER,
                |plugin, document, position| {
                    async move { plugin.references(document, position).await }.boxed()
                },
                |locations: Vec<Location>, target| {
                    Some(
                        locations
                            .into_iter()
                            .filter_map(|location| translator.location(location, target))
                            .collect::<Vec<_>>(),
                    )
                },
                concat,
            )
            .await?;

        Some(with_locations(locations))
    }
}
