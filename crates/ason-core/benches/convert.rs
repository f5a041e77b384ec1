//! Conversion and comparison benchmarks.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use ason_core::{convert, Ason, HostValue};

fn list_of(n: usize) -> HostValue {
    HostValue::List((0..n).map(HostValue::from).collect())
}

fn record_of(n: usize) -> HostValue {
    HostValue::map((0..n).map(|i| (format!("field_{i}"), HostValue::from(format!("value {i}")))))
}

/// Lists build one exactness term per position, so cost grows with the square of the length.
fn bench_convert_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert_list");
    for n in [10, 50, 200] {
        let input = list_of(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &input, |b, input| {
            b.iter(|| convert(black_box(input)));
        });
    }
    group.finish();
}

fn bench_convert_map(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert_map");
    for n in [10, 50, 200] {
        let input = record_of(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &input, |b, input| {
            b.iter(|| convert(black_box(input)));
        });
    }
    group.finish();
}

fn bench_containment(c: &mut Criterion) {
    let record = Ason::new(record_of(200)).unwrap();
    let pattern = Ason::parse(r#"{"field_0": *, "field_199": *, *}"#).unwrap();
    c.bench_function("record_lt_pattern", |b| {
        b.iter(|| black_box(&record) < black_box(&pattern));
    });
}

criterion_group!(benches, bench_convert_list, bench_convert_map, bench_containment);
criterion_main!(benches);
