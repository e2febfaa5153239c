//! Benchmarks for batch framing and overflow bookkeeping.

use std::time::{Duration, SystemTime};

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use femtoshipper::{
    BatchRef, LogLine, OverflowBuffer,
    transport::{DEFAULT_MAX_FRAME_SIZE, FrameEncoder},
};

fn sample_lines(count: usize) -> Vec<LogLine> {
    (0..count)
        .map(|i| {
            LogLine::from(format!(
                "2024-01-01T00:00:00.000Z INFO  app::http request {i} served in 12ms"
            ))
        })
        .collect()
}

fn bench_encode_batch(c: &mut Criterion) {
    let lines = sample_lines(1_000);
    let now = SystemTime::now();
    c.bench_function("encode_batch_1000_lines", |b| {
        let mut encoder = FrameEncoder::new(std::io::sink(), DEFAULT_MAX_FRAME_SIZE);
        b.iter(|| {
            let batch = BatchRef::new("bench-host", &lines, now, Duration::from_secs(10));
            encoder.encode(black_box(&batch)).expect("encode batch");
        });
    });
}

fn bench_overflow_eviction(c: &mut Criterion) {
    let lines = sample_lines(500);
    c.bench_function("overflow_append_with_eviction", |b| {
        b.iter_batched(
            || {
                let mut buffer = OverflowBuffer::new(1_000);
                buffer.append(lines.iter().cloned());
                buffer.append(lines.iter().cloned());
                buffer
            },
            |mut buffer| black_box(buffer.append(lines.iter().cloned())),
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_encode_batch, bench_overflow_eviction);
criterion_main!(benches);
