//! Benchmarks for rabin-chunker.
//!
//! Run with:
//!     cargo bench

use std::io::Cursor;

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};

use rabin_chunker::{ChunkConfig, Chunker, DEFAULT_POLYNOMIAL, RollingHash};

fn pseudo_random(size: usize) -> Vec<u8> {
    let mut state = 0x9E37_79B9_7F4A_7C15u64;
    (0..size)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state >> 32) as u8
        })
        .collect()
}

fn bench_rolling_hash(c: &mut Criterion) {
    let mut group = c.benchmark_group("rolling_hash");
    let data = pseudo_random(1024 * 1024);

    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("roll_1mb", |b| {
        let mut hash = RollingHash::for_polynomial(DEFAULT_POLYNOMIAL).unwrap();
        b.iter(|| {
            for &byte in black_box(&data) {
                hash.roll(byte);
            }
            black_box(hash.digest())
        });
    });

    group.finish();
}

fn bench_chunker(c: &mut Criterion) {
    let mut group = c.benchmark_group("chunker");
    let chunker = Chunker::default();

    for size in [1024 * 1024, 16 * 1024 * 1024] {
        let data = pseudo_random(size);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(
            format!("random_{}mb", size / (1024 * 1024)),
            &data,
            |b, data| {
                b.iter(|| {
                    let chunks = chunker.chunk_bytes(black_box(data.clone()));
                    black_box(chunks.len())
                });
            },
        );

        // All zeros: every boundary lands on min_size
        let zeros = vec![0u8; size];
        group.bench_with_input(
            format!("zeros_{}mb", size / (1024 * 1024)),
            &zeros,
            |b, data| {
                b.iter(|| {
                    let chunks = chunker.chunk_bytes(black_box(data.clone()));
                    black_box(chunks.len())
                });
            },
        );
    }

    group.finish();
}

fn bench_configs(c: &mut Criterion) {
    let mut group = c.benchmark_group("configs");
    let data = pseudo_random(4 * 1024 * 1024);
    group.throughput(Throughput::Bytes(data.len() as u64));

    let configs = [
        (
            "small_chunks",
            ChunkConfig::new(2 * 1024, 64 * 1024).unwrap().with_average_bits(13),
        ),
        ("default_chunks", ChunkConfig::default()),
        (
            "min_below_window",
            ChunkConfig::new(32, 64 * 1024).unwrap().with_average_bits(13),
        ),
    ];

    for (name, config) in configs {
        let chunker = Chunker::new(config).unwrap();
        group.bench_function(name, |b| {
            b.iter(|| {
                let chunks = chunker.chunk_bytes(black_box(data.clone()));
                black_box(chunks.len())
            });
        });
    }

    group.finish();
}

fn bench_streaming(c: &mut Criterion) {
    let mut group = c.benchmark_group("streaming");
    let data = pseudo_random(16 * 1024 * 1024);
    let chunker = Chunker::default();

    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("iterator", |b| {
        b.iter(|| {
            let mut count = 0;
            for chunk in chunker.chunk(Cursor::new(black_box(&data))) {
                black_box(chunk.unwrap());
                count += 1;
            }
            black_box(count)
        });
    });

    group.bench_function("session_next_into", |b| {
        let mut buf = vec![0u8; rabin_chunker::DEFAULT_MAX_SIZE];
        b.iter(|| {
            let mut session = chunker.session(Cursor::new(black_box(&data)));
            let mut total = 0usize;
            loop {
                let n = session.next_into(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                total += n;
            }
            black_box(total)
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_rolling_hash,
    bench_chunker,
    bench_configs,
    bench_streaming
);
criterion_main!(benches);
