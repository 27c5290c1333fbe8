//! Scanning of a single byte range with line-boundary realignment.
//!
//! A worker owns every line that *starts* inside its range. Lines that begin
//! before `range.start` belong to the previous worker, which reads past its own
//! `end` to finish them.

use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;

use crate::error::ScanError;
use crate::line::parse_severity;

use super::aggregate::SeverityCounts;
use super::plan::ByteRange;

const READ_BUFFER_SIZE: usize = 1024 * 1024;

/// What one worker saw in its range
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkReport {
    pub counts: SeverityCounts,
    pub lines: u64,
    /// Bytes read, including the skipped partial line and any overrun past `end`
    pub bytes_read: u64,
    /// Offset of the first malformed line, if any
    pub first_malformed_at: Option<u64>,
}

/// Count severities for every line starting in `range`
pub fn scan_chunk(path: &Path, range: ByteRange) -> Result<ChunkReport, ScanError> {
    let file = File::open(path).map_err(|source| ScanError::Open {
        path: path.to_path_buf(),
        range,
        source,
    })?;
    let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);
    let mut report = ChunkReport::default();

    let read_err = |offset: u64| {
        move |source| ScanError::Read {
            path: path.to_path_buf(),
            range,
            offset,
            source,
        }
    };

    // Start one byte early so a range beginning exactly on a line start keeps
    // that line: the skipped "partial line" is then just the previous newline.
    let mut pos = range.start.saturating_sub(1);
    reader
        .seek(SeekFrom::Start(pos))
        .map_err(|source| ScanError::Seek {
            path: path.to_path_buf(),
            range,
            offset: pos,
            source,
        })?;

    let mut buf = Vec::with_capacity(256);
    if range.start > 0 {
        let skipped = reader.read_until(b'\n', &mut buf).map_err(read_err(pos))? as u64;
        pos += skipped;
        report.bytes_read += skipped;
    }

    while pos < range.end {
        buf.clear();
        let n = reader.read_until(b'\n', &mut buf).map_err(read_err(pos))? as u64;
        if n == 0 {
            break;
        }

        match parse_severity(&buf) {
            Ok(severity) => report.counts.record_bytes(severity),
            Err(kind) => {
                if report.first_malformed_at.is_none() {
                    tracing::warn!(
                        offset = pos,
                        range = %range,
                        reason = %kind,
                        "malformed log line"
                    );
                    report.first_malformed_at = Some(pos);
                }
                report.counts.record_malformed();
            }
        }

        report.lines += 1;
        pos += n;
        report.bytes_read += n;
    }

    Ok(report)
}
