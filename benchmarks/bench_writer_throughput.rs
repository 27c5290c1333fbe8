use std::hint::black_box;
use std::sync::atomic::AtomicBool;

use criterion::{criterion_group, criterion_main, Criterion};
use tempfile::tempdir;

use logbench::clock::{Clock, ClockCache, FixedClock};
use logbench::line::LogLine;
use logbench::producer::ProducerPool;
use logbench::writer::BoundedLogWriter;

const MESSAGE: &str = "This is a log message content";

fn severities() -> Vec<String> {
    ["INFO", "WARN", "ERROR", "DEBUG"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn bench_serialize_line(c: &mut Criterion) {
    let clock = FixedClock::new("2024-01-01 00:00:00");
    let mut buf = String::new();
    c.bench_function("serialize_line", |b| {
        b.iter(|| {
            let ts = clock.current();
            LogLine {
                timestamp: &ts,
                severity: black_box("ERROR"),
                producer_id: black_box(4242),
                message: black_box(MESSAGE),
            }
            .write_into(&mut buf);
            black_box(buf.len());
        });
    });
}

fn bench_cached_clock_read(c: &mut Criterion) {
    let clock = ClockCache::start();
    c.bench_function("cached_clock_read", |b| {
        b.iter(|| black_box(clock.current()));
    });
}

fn bench_single_producer_log(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let writer = BoundedLogWriter::open(
        dir.path().join("single.log"),
        u64::MAX,
        FixedClock::new("2024-01-01 00:00:00"),
    )
    .unwrap();
    c.bench_function("single_producer_log", |b| {
        b.iter(|| writer.log(black_box("INFO"), black_box(MESSAGE)).unwrap());
    });
}

fn bench_pool_fill_4mb(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_fill");
    group.sample_size(10);
    group.bench_function("4mb_4_producers", |b| {
        b.iter(|| {
            let dir = tempdir().unwrap();
            let writer = BoundedLogWriter::open(
                dir.path().join("pool.log"),
                4 * 1024 * 1024,
                ClockCache::start(),
            )
            .unwrap();
            let report = ProducerPool::new(4, severities(), MESSAGE).run(&writer, &AtomicBool::new(false));
            writer.close().unwrap();
            black_box(report.total_lines());
        });
    });
    group.finish();
}

criterion_group!(
    writer_benches,
    bench_serialize_line,
    bench_cached_clock_read,
    bench_single_producer_log,
    bench_pool_fill_4mb
);
criterion_main!(writer_benches);
