//! Criterion benchmarks for the evrelay datagram codec and filter.
//!
//! Measures the per-datagram work on the inject side: decode a full batch and
//! run the admissibility predicate over every record.
//!
//! Run with:
//! ```bash
//! cargo bench --package evrelay-core --bench codec_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use evrelay_core::protocol::record::{EV_KEY, EV_REL, EV_SYN, REL_X, REL_Y, SYN_REPORT};
use evrelay_core::{decode_batch, encode_batch, is_admissible, InputEventRecord};

// ── Fixtures ──────────────────────────────────────────────────────────────────

fn mouse_motion_batch(len: usize) -> Vec<InputEventRecord> {
    (0..len)
        .map(|i| match i % 3 {
            0 => InputEventRecord::new(EV_REL, REL_X, 3),
            1 => InputEventRecord::new(EV_REL, REL_Y, -2),
            _ => InputEventRecord::new(EV_SYN, SYN_REPORT, 0),
        })
        .collect()
}

// ── Benchmarks ────────────────────────────────────────────────────────────────

fn bench_single_record(c: &mut Criterion) {
    let record = InputEventRecord::new(EV_KEY, 30, 1).with_timestamp(1_700_000_000, 42);
    c.bench_function("record_to_bytes", |b| b.iter(|| black_box(record).to_bytes()));

    let bytes = record.to_bytes();
    c.bench_function("record_from_bytes", |b| {
        b.iter(|| InputEventRecord::from_bytes(black_box(&bytes)))
    });
}

fn bench_batch_decode_and_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_decode_and_filter");
    for len in [1usize, 3, 10] {
        let bytes = encode_batch(&mouse_motion_batch(len));
        group.bench_with_input(BenchmarkId::from_parameter(len), &bytes, |b, bytes| {
            b.iter(|| {
                decode_batch(black_box(bytes))
                    .records
                    .iter()
                    .filter(|r| is_admissible(r))
                    .count()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_single_record, bench_batch_decode_and_filter);
criterion_main!(benches);
