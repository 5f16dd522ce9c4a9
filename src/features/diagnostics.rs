use futures::FutureExt;
use tower_lsp_server::ls_types::{Diagnostic, DiagnosticRelatedInformation};
use url::Url;

use super::dedupe::with_diagnostics;
use super::transform::SourceTranslator;
use super::worker::{FeatureWorker, QueryTarget, concat};
use crate::mapping::{FileCapabilities, MappingCapabilities};

fn accepts_diagnostic(caps: &MappingCapabilities) -> bool {
    caps.diagnostic
}

impl FeatureWorker {
    /// Diagnostics of every embedded document of `uri`, in source coordinates
    ///
    /// Diagnostics in unmapped text are dropped, as are related locations that
    /// cannot be traced.
    pub async fn diagnostics(&self, uri: &Url) -> Vec<Diagnostic> {
        let translator = SourceTranslator::new(self.registry(), accepts_diagnostic);

        let diagnostics = self
            .document_feature(
                uri,
                |caps: &FileCapabilities| caps.diagnostic,
                |plugin, document| async move { plugin.diagnostics(document).await }.boxed(),
                |diagnostics: Vec<Diagnostic>, target| {
                    Some(
                        diagnostics
                            .into_iter()
                            .filter_map(|diagnostic| {
                                translate_diagnostic(&translator, diagnostic, target)
                            })
                            .collect::<Vec<_>>(),
                    )
                },
                concat,
            )
            .await
            .unwrap_or_default();

        with_diagnostics(diagnostics)
    }
}

fn translate_diagnostic(
    translator: &SourceTranslator<'_>,
    mut diagnostic: Diagnostic,
    target: &QueryTarget,
) -> Option<Diagnostic> {
    diagnostic.range = translator.origin_range(target, diagnostic.range)?;
    diagnostic.related_information = diagnostic.related_information.map(|related| {
        related
            .into_iter()
            .filter_map(|info| {
                translator
                    .location(info.location, target)
                    .map(|location| DiagnosticRelatedInformation {
                        location,
                        message: info.message,
                    })
            })
            .collect()
    });
    Some(diagnostic)
}
