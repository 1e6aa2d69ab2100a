// Classification Performance Benchmarks
//
// Compile time and per-query throughput as the pattern set grows

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use multire_engine::{PatternRegistry, QueryMode};
use std::hint::black_box;

/// Host-style URL patterns, one per site
fn url_patterns(count: usize) -> PatternRegistry<usize> {
    let mut registry = PatternRegistry::new();
    for i in 0..count {
        registry.register(format!(r"https?://([a-z0-9-]+\.)*site{i}\.com(/.*)?"), i);
    }
    registry.register(r"https?://.*", usize::MAX);
    registry
}

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");
    group.sample_size(10);

    for pattern_count in [10, 50, 200].iter() {
        let registry = url_patterns(*pattern_count);

        group.bench_with_input(
            BenchmarkId::new("url_patterns", pattern_count),
            &registry,
            |b, registry| {
                b.iter(|| black_box(registry.compile().unwrap()));
            },
        );
    }

    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("query");

    for pattern_count in [10, 50, 200].iter() {
        let engine = url_patterns(*pattern_count).into_compiled().unwrap();
        let input = format!("https://www.site{}.com/path/to/page?x=1", pattern_count / 2);
        group.throughput(Throughput::Bytes(input.len() as u64));

        for mode in QueryMode::all() {
            group.bench_with_input(
                BenchmarkId::new(mode.to_string(), pattern_count),
                &input,
                |b, input| {
                    b.iter(|| black_box(engine.query(*mode, black_box(input))));
                },
            );
        }
    }

    group.finish();
}

fn bench_miss(c: &mut Criterion) {
    let engine = url_patterns(200).into_compiled().unwrap();

    c.bench_function("query_miss_first_char", |b| {
        b.iter(|| black_box(engine.query_longest(black_box("ftp://site1.com/"))));
    });
}

criterion_group!(benches, bench_compile, bench_query, bench_miss);
criterion_main!(benches);
