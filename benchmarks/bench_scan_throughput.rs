use std::hint::black_box;
use std::path::Path;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tempfile::{tempdir, TempDir};

use logbench::clock::FixedClock;
use logbench::line::parse_severity;
use logbench::scan::ParallelScanner;
use logbench::writer::{BoundedLogWriter, SeededIds};

const FILE_SIZE: u64 = 16 * 1024 * 1024;

fn build_log_file() -> (TempDir, u64) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bench.log");
    let writer = BoundedLogWriter::open_with_ids(
        &path,
        FILE_SIZE,
        FixedClock::new("2024-01-01 00:00:00"),
        SeededIds::new(1),
    )
    .unwrap();
    let severities = ["INFO", "WARN", "ERROR", "DEBUG"];
    let mut rng = fastrand::Rng::with_seed(1);
    while writer
        .log(severities[rng.usize(..4)], "This is a log message content")
        .is_ok()
    {}
    writer.close().unwrap();
    let size = std::fs::metadata(&path).unwrap().len();
    (dir, size)
}

fn bench_parse_severity(c: &mut Criterion) {
    let line = b"2024-01-01 00:00:00 [ERROR] ProducerID:7 Message:This is a log message content\n";
    c.bench_function("parse_severity", |b| {
        b.iter(|| black_box(parse_severity(black_box(line)).unwrap()));
    });
}

fn bench_parallel_scan(c: &mut Criterion) {
    let (dir, size) = build_log_file();
    let path: &Path = &dir.path().join("bench.log");

    let mut group = c.benchmark_group("parallel_scan");
    group.sample_size(10);
    group.throughput(Throughput::Bytes(size));
    let mut worker_counts = vec![1, 2, 4, num_cpus::get()];
    worker_counts.sort_unstable();
    worker_counts.dedup();
    for workers in worker_counts {
        group.bench_with_input(BenchmarkId::from_parameter(workers), &workers, |b, &workers| {
            let scanner = ParallelScanner::new(workers);
            b.iter(|| black_box(scanner.scan(path).unwrap().totals.total()));
        });
    }
    group.finish();
}

criterion_group!(scan_benches, bench_parse_severity, bench_parallel_scan);
criterion_main!(scan_benches);
