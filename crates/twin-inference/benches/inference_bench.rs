use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};

use twin_graph::{SituationGraph, SituationGraphBuilder, SituationSpec};
use twin_inference::InferenceEngine;

/// One layer of `n` situations, each caused by up to three predecessors.
fn build_layered_network(n: i64) -> SituationGraph {
    let specs = (0..n)
        .map(|i| {
            let mut spec = SituationSpec::new(i);
            for back in 1..=3 {
                if i - back >= 0 && (i + back) % 2 == 0 {
                    spec = spec.cause(i - back, 0.5 + 0.1 * back as f64);
                }
            }
            spec
        })
        .collect();
    SituationGraphBuilder::new().layer(specs).build().unwrap()
}

fn bench_compile(c: &mut Criterion) {
    let graph = Arc::new(build_layered_network(60));
    c.bench_function("compile_60_nodes", |b| {
        b.iter(|| InferenceEngine::new(Arc::clone(&graph), 20).unwrap());
    });
}

fn bench_infer(c: &mut Criterion) {
    let graph = Arc::new(build_layered_network(60));
    let engine = InferenceEngine::new(Arc::clone(&graph), 20).unwrap();
    let evidence: Vec<Option<bool>> = (0..graph.len())
        .map(|i| match i % 3 {
            0 => Some(true),
            1 => None,
            _ => Some(false),
        })
        .collect();

    c.bench_function("infer_60_nodes", |b| {
        b.iter(|| engine.infer(&evidence).unwrap());
    });
}

criterion_group!(benches, bench_compile, bench_infer);
criterion_main!(benches);
