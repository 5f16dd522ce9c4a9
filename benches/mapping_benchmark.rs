//! Benchmark for mapping lookups over large tables.
//!
//! Measures offset and range translation in a source map with one entry per
//! interpolation, the shape produced by template-heavy documents.

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use embedmap::{
    Bias, DocumentSourceMap, EmbeddedDocuments, Mapping, MappingCapabilities, MappingRange,
    SourceMap, TextSnapshot, VirtualFile, accept_all,
};
use tower_lsp_server::ls_types::Position;
use url::Url;

/// Generate a template with N `{{ value_i }}` interpolations, one per line,
/// and the mappings relating each interpolation to a generated script.
fn generate_template(num_entries: usize) -> (String, String, Vec<Mapping<MappingCapabilities>>) {
    let mut source = String::with_capacity(num_entries * 32);
    let mut generated = String::with_capacity(num_entries * 16);
    let mut mappings = Vec::with_capacity(num_entries);

    for i in 0..num_entries {
        let name = format!("value_{}", i);
        source.push_str("<p>{{ ");
        let source_start = source.len();
        source.push_str(&name);
        source.push_str(" }}</p>\n");

        let generated_start = generated.len();
        generated.push_str(&name);
        generated.push_str(";\n");

        mappings.push(Mapping::new(
            source_start..source_start + name.len(),
            generated_start..generated_start + name.len(),
            MappingCapabilities::full(),
        ));
    }

    (source, generated, mappings)
}

fn benchmark_offset_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("offset_lookup");

    for num_entries in [10, 100, 1000, 5000].iter() {
        let (source, _, mappings) = generate_template(*num_entries);
        let map = SourceMap::new(mappings);
        // Last interpolation: worst case for the linear scan
        let offset = source.len() - " }}</p>\n".len() - 1;

        group.bench_with_input(
            BenchmarkId::new("to_generated_offset", num_entries),
            &(&map, offset),
            |b, (map, offset)| b.iter(|| map.to_generated_offset(*offset, accept_all, Bias::Left)),
        );

        group.bench_with_input(
            BenchmarkId::new("to_source_range", num_entries),
            &map,
            |b, map| {
                let last = map.mappings()[map.len() - 1].generated_range;
                let range = MappingRange::new(last.start + 1, last.end);
                b.iter(|| map.to_source_range(range, accept_all))
            },
        );
    }

    group.finish();
}

fn benchmark_position_lookup(c: &mut Criterion) {
    let num_entries = 2000;
    let (source, generated, mappings) = generate_template(num_entries);
    let Ok(source_uri) = Url::parse("file:///bench/Page.vue") else {
        return;
    };
    let Ok(generated_uri) = Url::parse("file:///bench/Page.vue.ts") else {
        return;
    };
    let map = DocumentSourceMap::new(
        Arc::new(TextSnapshot::new(source_uri, "vue", 1, source)),
        Arc::new(TextSnapshot::new(generated_uri, "typescript", 1, generated)),
        SourceMap::new(mappings),
    );

    let mut group = c.benchmark_group("position_lookup");
    group.sample_size(20);

    let position = Position::new(num_entries as u32 - 1, 8);
    group.bench_function("2000_entries_to_generated", |b| {
        b.iter(|| map.to_generated_position(position, accept_all, Bias::Left))
    });

    group.finish();
}

fn benchmark_bundle_build(c: &mut Criterion) {
    let Ok(uri) = Url::parse("file:///bench/Page.vue") else {
        return;
    };
    let mut group = c.benchmark_group("bundle_build");

    for num_entries in [100, 1000].iter() {
        let (source, generated, mappings) = generate_template(*num_entries);
        let snapshot = Arc::new(TextSnapshot::new(uri.clone(), "vue", 1, source));
        let root: VirtualFile =
            VirtualFile::new("Page.vue.ts", "typescript", generated, mappings);

        group.bench_with_input(
            BenchmarkId::new("build", num_entries),
            &(&snapshot, &root),
            |b, (snapshot, root)| {
                b.iter(|| EmbeddedDocuments::build(Arc::clone(snapshot), (*root).clone()))
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_offset_lookup,
    benchmark_position_lookup,
    benchmark_bundle_build
);
criterion_main!(benches);
