//! # Export Benchmarks
//!
//! Performance benchmarks for building and exporting containment graphs.
//!
//! Run with: `cargo bench -p topology-core`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use topology_core::Session;

/// One network per `width`, each holding `width` VMs with one disk apiece.
fn create_wide_session(width: usize) -> Session {
    let mut session = Session::new();

    for _ in 0..width {
        let net = session.add_node("network").expect("network").id;
        for _ in 0..width {
            let vm = session.add_node("vm").expect("vm").id;
            session.add_edge(net, vm).expect("network -> vm");
            let disk = session.add_node("storage").expect("storage").id;
            session.add_edge(vm, disk).expect("vm -> storage");
        }
    }

    session
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_graph_building(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_building");

    for width in [5, 10, 20].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(width), width, |b, &width| {
            b.iter(|| black_box(create_wide_session(width)));
        });
    }

    group.finish();
}

fn bench_build_document(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_document");

    for width in [5, 10, 20].iter() {
        let session = create_wide_session(*width);
        group.bench_with_input(BenchmarkId::from_parameter(width), &session, |b, session| {
            b.iter(|| black_box(session.build_document()));
        });
    }

    group.finish();
}

fn bench_label_collisions(c: &mut Criterion) {
    let session = create_wide_session(10);
    c.bench_function("label_collisions/10", |b| {
        b.iter(|| black_box(session.label_collisions()));
    });
}

criterion_group!(
    benches,
    bench_graph_building,
    bench_build_document,
    bench_label_collisions
);
criterion_main!(benches);
