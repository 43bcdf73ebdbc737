//! Benchmarks for the per-turn extraction pipeline.
//!
//! Extraction and normalization run under the session lock, so their cost
//! bounds how long a turn holds it. These benchmarks measure bulk
//! extraction over a full schema and per-field normalization.

use std::time::Duration;

use criterion::{criterion_group, criterion_main, Criterion};
use hearth_core::types::Session;
use hearth_dialogue::catalog::{bread_schema, recipe_schema};
use hearth_dialogue::extractor::extract_bulk;
use hearth_dialogue::normalizer::normalize;
use hearth_dialogue::resolver::{advance, ResolveOptions};
use hearth_dialogue::FieldSpec;

const BREAD_REPLY: &str = "beginner, focaccia, whole wheat, dry yeast, stand mixer, \
                           24h, 21C, 2 loaves, none, step-by-step";

const RECIPE_REPLY: &str = "intermediate, Italian main course for 4 people, include chicken \
                            and lemon, avoid nuts, oven, 1 hour, gluten-free, healthy, compact";

/// Bulk extraction over every field of a schema.
fn bench_bulk_extraction(c: &mut Criterion) {
    let bread = bread_schema();
    let recipe = recipe_schema();
    let bread_fields: Vec<&FieldSpec> = bread.fields.iter().collect();
    let recipe_fields: Vec<&FieldSpec> = recipe.fields.iter().collect();

    let mut group = c.benchmark_group("bulk_extraction");
    group.sample_size(200);
    group.measurement_time(Duration::from_secs(5));

    group.bench_function("bread_full_reply", |b| {
        b.iter(|| extract_bulk(&bread, &bread_fields, BREAD_REPLY));
    });

    group.bench_function("recipe_full_reply", |b| {
        b.iter(|| extract_bulk(&recipe, &recipe_fields, RECIPE_REPLY));
    });

    group.bench_function("bread_no_match", |b| {
        b.iter(|| extract_bulk(&bread, &bread_fields, "hmm, let me think about it"));
    });

    group.finish();
}

/// Normalization of typical guided answers.
fn bench_normalize(c: &mut Criterion) {
    let bread = bread_schema();
    let inputs = [
        ("fermentation_time", "about 24 hours"),
        ("room_temperature", "21 C"),
        ("final_amount", "500 grams"),
        ("equipment", "hand kneading and a dutch oven"),
        ("dietary", "something unusual"),
    ];
    let fields: Vec<(&FieldSpec, &str)> = inputs
        .iter()
        .filter_map(|(id, text)| bread.field(id).map(|f| (f, *text)))
        .collect();

    let mut group = c.benchmark_group("normalize");
    group.sample_size(200);

    group.bench_function("bread_guided_answers", |b| {
        b.iter(|| {
            fields
                .iter()
                .map(|(field, text)| normalize(field, text))
                .collect::<Vec<_>>()
        });
    });

    group.finish();
}

/// A complete bulk conversation through the resolver.
fn bench_resolver_turns(c: &mut Criterion) {
    let bread = bread_schema();
    let opts = ResolveOptions::default();

    let mut group = c.benchmark_group("resolver");
    group.bench_function("bread_bulk_conversation", |b| {
        b.iter(|| {
            let mut session = Session::new("bench", "bread");
            advance(&bread, &mut session, "all at once", opts);
            advance(&bread, &mut session, BREAD_REPLY, opts)
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_bulk_extraction,
    bench_normalize,
    bench_resolver_turns
);
criterion_main!(benches);
