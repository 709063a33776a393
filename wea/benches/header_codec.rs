//! Header codec benchmark
//!
//! Measures encode, decode and the size arithmetic for shapes of
//! increasing rank, plus the cost of wrapping a buffer in a handle.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box as bb;
use wea::{decode, encode, segment_size, BufferedExchange, ElementType, HeaderRef};

const SHAPES: [&[usize]; 4] = [&[1024], &[64, 32], &[8, 8, 8, 8], &[2, 2, 2, 2, 2, 2, 2, 2, 2, 2]];

fn bench_segment_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("segment_size");
    for shape in SHAPES {
        group.bench_with_input(BenchmarkId::from_parameter(shape.len()), &shape, |b, shape| {
            b.iter(|| segment_size(bb(shape), ElementType::Float64))
        });
    }
    group.finish();
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    for shape in SHAPES {
        let (total, _, _) = segment_size(shape, ElementType::Float32).unwrap();
        let mut buffer = vec![0u8; total];
        group.bench_with_input(BenchmarkId::from_parameter(shape.len()), &shape, |b, shape| {
            b.iter(|| encode(bb(&mut buffer), ElementType::Float32, bb(shape)))
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    for shape in SHAPES {
        let handle = BufferedExchange::create(ElementType::Int32, shape).unwrap();
        let bytes = handle.exchange_buffer();
        group.bench_with_input(BenchmarkId::new("owned", shape.len()), &bytes, |b, bytes| {
            b.iter(|| decode(bb(bytes)))
        });
        group.bench_with_input(BenchmarkId::new("borrowed", shape.len()), &bytes, |b, bytes| {
            b.iter(|| HeaderRef::parse(bb(bytes)).map(|h| h.element_count()))
        });
    }
    group.finish();
}

fn bench_load(c: &mut Criterion) {
    let handle = BufferedExchange::create(ElementType::Float64, &[256, 256]).unwrap();
    let bytes = handle.exchange_buffer();
    c.bench_function("load_512k", |b| b.iter(|| BufferedExchange::load(bb(&bytes))));
}

criterion_group!(benches, bench_segment_size, bench_encode, bench_decode, bench_load);
criterion_main!(benches);
