//! Benchmark harness for a simple structured-log pipeline.
//!
//! The writer half appends `<timestamp> [<SEVERITY>] ProducerID:<id> Message:<text>`
//! lines from many threads into a file capped at a byte budget. The scanner half
//! splits the file into byte ranges, counts severities per range in parallel and
//! merges the per-worker tables.

pub mod clock;
pub mod config;
pub mod config_file;
pub mod error;
pub mod line;
pub mod logging;
pub mod platform;
pub mod producer;
pub mod runner;
pub mod scan;
pub mod stats;
pub mod writer;

pub use clock::{Clock, ClockCache, FixedClock};
pub use config::{HarnessConfig, ScannerConfig, WriterConfig};
pub use error::{MalformedLine, ScanError, WriteError};
pub use line::{parse_severity, LogLine};
pub use producer::{PoolReport, ProducerPool, StopReason};
pub use scan::{
    merge, plan, scan_chunk, ByteRange, ChunkReport, ParallelScanner, ScanSummary,
    SeverityCounts,
};
pub use writer::{BoundedLogWriter, IdSource, SeededIds, ThreadRandomIds};
