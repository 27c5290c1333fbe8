//! Top-level generate and scan runs, shared by the CLI and integration tests.

use std::sync::atomic::AtomicBool;

use anyhow::{Context, Result};

use crate::clock::{Clock, ClockCache};
use crate::config::{ScannerConfig, WriterConfig};
use crate::platform::SafeStdout;
use crate::producer::{PoolReport, ProducerPool};
use crate::scan::{ParallelScanner, ScanSummary};
use crate::stats::{GenerateStats, ScanStats};
use crate::writer::{BoundedLogWriter, IdSource, SeededIds, ThreadRandomIds};

/// Result of a generate run
#[derive(Debug)]
pub struct GenerateOutcome {
    pub report: PoolReport,
    pub stats: GenerateStats,
}

/// Fill the configured log file until its budget is exhausted or `stop` is raised
pub fn run_generate(config: &WriterConfig, stop: &AtomicBool) -> Result<GenerateOutcome> {
    let mut clock = ClockCache::start();

    let outcome = match config.seed {
        Some(seed) => generate_with(config, &clock, SeededIds::new(seed), stop),
        None => generate_with(config, &clock, ThreadRandomIds, stop),
    };

    clock.shutdown();
    outcome
}

fn generate_with<C: Clock, I: IdSource>(
    config: &WriterConfig,
    clock: C,
    ids: I,
    stop: &AtomicBool,
) -> Result<GenerateOutcome> {
    let writer = BoundedLogWriter::open_with_ids(&config.file_path, config.max_size_bytes, clock, ids)
        .with_context(|| format!("Failed to open log file {}", config.file_path.display()))?;
    let initial_size = writer.current_size();

    let pool = ProducerPool::new(
        config.effective_producers(),
        config.severities.clone(),
        config.message.clone(),
    )
    .with_seed(config.seed);

    tracing::info!(
        path = %config.file_path.display(),
        max_size = config.max_size_bytes,
        producers = pool.producers(),
        "starting generate run"
    );

    let report = pool.run(&writer, stop);
    let bytes_written = writer.current_size() - initial_size;
    writer
        .close()
        .with_context(|| format!("Failed to flush log file {}", config.file_path.display()))?;

    let final_file_size = std::fs::metadata(&config.file_path)
        .with_context(|| format!("Failed to stat {}", config.file_path.display()))?
        .len();

    let stats = GenerateStats::from_report(&report, bytes_written, final_file_size);
    Ok(GenerateOutcome { report, stats })
}

/// Scan the configured file and aggregate severity counts
pub fn run_scan(config: &ScannerConfig) -> Result<ScanSummary> {
    let scanner = ParallelScanner::new(config.effective_workers());
    tracing::info!(
        path = %config.file_path.display(),
        workers = scanner.workers(),
        "starting scan run"
    );
    let summary = scanner
        .scan(&config.file_path)
        .with_context(|| format!("Failed to scan {}", config.file_path.display()))?;
    Ok(summary)
}

pub fn print_generate(out: &mut SafeStdout, outcome: &GenerateOutcome) -> Result<()> {
    for (producer_id, error) in outcome.report.failures() {
        out.writeln(&format!("Producer {} failed: {}", producer_id, error))?;
    }
    out.writeln(&outcome.stats.format_stats())?;
    out.flush()
}

/// Print totals sorted by severity, then any failed ranges, then the stats line
pub fn print_scan(out: &mut SafeStdout, summary: &ScanSummary) -> Result<()> {
    for (severity, count) in summary.totals.sorted() {
        out.writeln(&format!("{} {}", severity, count))?;
    }
    if summary.totals.malformed() > 0 {
        out.writeln(&format!("<malformed> {}", summary.totals.malformed()))?;
    }
    for failure in summary.failures() {
        if let Err(e) = &failure.result {
            out.writeln(&format!(
                "Worker {} failed on {}: {}",
                failure.worker_id,
                failure.range,
                describe_error(e)
            ))?;
        }
    }
    out.writeln(&ScanStats::from_summary(summary).format_stats())?;
    out.flush()
}

/// `error: cause: cause` on one line
fn describe_error(error: &dyn std::error::Error) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}
