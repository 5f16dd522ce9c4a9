use futures::FutureExt;
use tower_lsp_server::ls_types::{
    Hover, HoverContents, MarkedString, MarkupContent, MarkupKind, Position,
};
use url::Url;

use super::transform::SourceTranslator;
use super::worker::{FeatureFilter, FeatureWorker};
use crate::mapping::MappingCapabilities;

const HOVER_FILTER: FeatureFilter = FeatureFilter {
    mapping: |caps: &MappingCapabilities| caps.hover,
    teleport: None,
};

const HOVER_SEPARATOR: &str = "\n\n---\n\n";

impl FeatureWorker {
    /// Hover at `position` of source document `uri`
    ///
    /// With `mergeHovers` enabled the contents of every answering plugin are
    /// joined as markdown; otherwise the first answer wins.
    pub async fn hover(&self, uri: &Url, position: Position) -> Option<Hover> {
        let translator = SourceTranslator::new(self.registry(), HOVER_FILTER.mapping);
        let merge_hovers = self.settings().merge_hovers;

        self.language_feature(
            uri,
            position,
            HOVER_FILTER,
            |plugin, document, position| {
                async move { plugin.hover(document, position).await }.boxed()
            },
            |hover: Hover, target| {
                Some(Hover {
                    range: hover
                        .range
                        .and_then(|range| translator.origin_range(target, range)),
                    contents: hover.contents,
                })
            },
            |acc, next| {
                if merge_hovers {
                    merge_hover(acc, next)
                } else {
                    acc
                }
            },
        )
        .await
    }
}

fn merge_hover(first: Hover, second: Hover) -> Hover {
    Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value: format!(
                "{}{}{}",
                hover_markdown(first.contents),
                HOVER_SEPARATOR,
                hover_markdown(second.contents)
            ),
        }),
        range: first.range.or(second.range),
    }
}

fn hover_markdown(contents: HoverContents) -> String {
    match contents {
        HoverContents::Scalar(marked) => marked_markdown(marked),
        HoverContents::Array(items) => items
            .into_iter()
            .map(marked_markdown)
            .collect::<Vec<_>>()
            .join("\n\n"),
        HoverContents::Markup(markup) => markup.value,
    }
}

fn marked_markdown(marked: MarkedString) -> String {
    match marked {
        MarkedString::String(text) => text,
        MarkedString::LanguageString(code) => {
            format!("```{}\n{}\n```", code.language, code.value)
        }
    }
}
