//! Parallel severity scanner
//!
//! # Module Structure
//!
//! - `plan`: splitting a file length into worker byte ranges
//! - `chunk`: per-range scanning with boundary realignment
//! - `aggregate`: count tables and the fan-in merge

mod aggregate;
mod chunk;
mod plan;

pub use aggregate::{merge, SeverityCounts};
pub use chunk::{scan_chunk, ChunkReport};
pub use plan::{plan, ByteRange};

use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::unbounded;

use crate::error::ScanError;

/// One worker's result, tagged with the range it owned
#[derive(Debug)]
pub struct WorkerOutcome {
    pub worker_id: usize,
    pub range: ByteRange,
    pub result: Result<ChunkReport, ScanError>,
}

/// Aggregated result of a scan, with per-worker status
#[derive(Debug)]
pub struct ScanSummary {
    pub path: PathBuf,
    pub file_size: u64,
    /// Sum of every successful worker's table
    pub totals: SeverityCounts,
    /// Sorted by worker id
    pub outcomes: Vec<WorkerOutcome>,
    pub elapsed: Duration,
}

impl ScanSummary {
    /// True when every worker finished its range
    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &WorkerOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    pub fn lines(&self) -> u64 {
        self.successes().map(|r| r.lines).sum()
    }

    pub fn bytes_read(&self) -> u64 {
        self.successes().map(|r| r.bytes_read).sum()
    }

    fn successes(&self) -> impl Iterator<Item = &ChunkReport> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }
}

/// Scans one file with a fixed number of worker threads
#[derive(Debug, Clone)]
pub struct ParallelScanner {
    workers: usize,
}

impl ParallelScanner {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Plan ranges over the file's current size and scan them in parallel.
    ///
    /// Only a failure to stat the file is returned as `Err`; per-worker
    /// failures are reported in the summary.
    pub fn scan(&self, path: &Path) -> Result<ScanSummary, ScanError> {
        let start = Instant::now();
        let file_size = std::fs::metadata(path)
            .map_err(|source| ScanError::Stat {
                path: path.to_path_buf(),
                source,
            })?
            .len();

        let ranges = plan(file_size, self.workers);
        tracing::debug!(
            path = %path.display(),
            file_size,
            workers = ranges.len(),
            "planned scan ranges"
        );

        let (result_tx, result_rx) = unbounded::<WorkerOutcome>();

        thread::scope(|scope| {
            for (worker_id, range) in ranges.iter().copied().enumerate() {
                let result_tx = result_tx.clone();
                scope.spawn(move || {
                    let result = scan_chunk(path, range);
                    if let Err(e) = &result {
                        tracing::error!(worker_id, range = %range, error = %e, "scan worker failed");
                    }
                    // Receiver outlives the scope
                    let _ = result_tx.send(WorkerOutcome {
                        worker_id,
                        range,
                        result,
                    });
                });
            }
        });
        // All workers joined; closing our sender ends the channel
        drop(result_tx);

        let mut outcomes: Vec<WorkerOutcome> = result_rx.iter().collect();
        outcomes.sort_by_key(|o| o.worker_id);

        let totals = merge(
            outcomes
                .iter()
                .filter_map(|o| o.result.as_ref().ok())
                .map(|r| &r.counts),
        );

        Ok(ScanSummary {
            path: path.to_path_buf(),
            file_size,
            totals,
            outcomes,
            elapsed: start.elapsed(),
        })
    }
}
