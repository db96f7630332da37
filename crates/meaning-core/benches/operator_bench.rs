//! # Operator Benchmarks
//!
//! Performance benchmarks for meaning-core operators.
//!
//! Run with: `cargo bench -p meaning-core`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use meaning_core::{
    AttrQuery, Catalog, CatalogEntry, CatalogRegistry, GraphEdge, GraphNode, OperatorEngine,
    ProjectOptions, SeedData, SeedGraph,
};
use serde_json::json;
use std::hint::black_box;

const TAGS: [&str; 5] = ["editor", "ai", "free", "cli", "web"];

/// Create a graph with N nodes and edges between consecutive nodes.
fn create_linear_graph(size: usize) -> SeedGraph {
    let nodes = (0..size)
        .map(|i| {
            GraphNode::new(format!("n{i}"), "node")
                .with_field("tags", json!([TAGS[i % TAGS.len()]]))
        })
        .collect();
    let edges = (1..size)
        .map(|i| GraphEdge::new(format!("n{}", i - 1), format!("n{i}"), "link"))
        .collect();
    SeedGraph::from_seed(&SeedData::new(nodes, edges))
}

/// Create a registry with one catalog of N tagged, dated entries.
fn create_registry(size: usize) -> CatalogRegistry {
    let entries = (0..size)
        .map(|i| {
            CatalogEntry::new(format!("e{i}"))
                .with_field("tags", json!([TAGS[i % TAGS.len()], TAGS[(i + 2) % TAGS.len()]]))
                .with_field("year", json!(1990 + (i % 35)))
        })
        .collect();
    let mut registry = CatalogRegistry::new();
    registry
        .load("tools", Catalog::new("tools", entries))
        .expect("load");
    registry
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_expand(c: &mut Criterion) {
    let mut group = c.benchmark_group("expand");
    let registry = CatalogRegistry::new();

    for size in [100, 1000, 10000].iter() {
        let graph = create_linear_graph(*size);
        let ops = OperatorEngine::new(&graph, &registry);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(ops.expand("n0", 10)));
        });
    }

    group.finish();
}

fn bench_project(c: &mut Criterion) {
    let mut group = c.benchmark_group("project");
    let graph = create_linear_graph(10);

    for size in [100, 1000, 10000].iter() {
        let registry = create_registry(*size);
        let ops = OperatorEngine::new(&graph, &registry);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(ops.project("n1", "tools", ProjectOptions::default())));
        });
    }

    group.finish();
}

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter");
    let query = AttrQuery::new().gte("year", 2010).contains("tags", "ai");

    for size in [100, 1000, 10000].iter() {
        let entries = create_registry(*size).entries("tools");

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(OperatorEngine::filter(&entries, &query)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_expand, bench_project, bench_filter);

criterion_main!(benches);
