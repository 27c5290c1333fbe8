//! Typed errors for the writer and scanner halves.
//!
//! The application layer wraps these in `anyhow` with context; library callers
//! match on them to tell a full budget apart from a broken disk.

use std::io;
use std::path::PathBuf;

use crate::scan::ByteRange;

/// Failure of a single `BoundedLogWriter::log` call
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// The line would push the file past its byte budget. Latched: once
    /// returned, every later call returns it too.
    #[error("log file limit reached ({max_size} bytes), writing stopped")]
    LimitExceeded { max_size: u64 },

    #[error("log writer is closed")]
    Closed,

    /// An earlier write hit a storage failure; the writer accepts nothing more
    #[error("log writer stopped after a storage failure")]
    Failed,

    #[error("failed to write log file {path}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl WriteError {
    pub fn is_limit(&self) -> bool {
        matches!(self, WriteError::LimitExceeded { .. })
    }
}

/// Failure of one scan worker over its byte range
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("failed to open {path} for range {range}")]
    Open {
        path: PathBuf,
        range: ByteRange,
        #[source]
        source: io::Error,
    },

    #[error("failed to seek {path} to offset {offset} for range {range}")]
    Seek {
        path: PathBuf,
        range: ByteRange,
        offset: u64,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {path} at offset {offset} for range {range}")]
    Read {
        path: PathBuf,
        range: ByteRange,
        offset: u64,
        #[source]
        source: io::Error,
    },

    #[error("failed to stat {path}")]
    Stat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ScanError {
    /// The range the failing worker owned, if the failure is worker-scoped
    pub fn range(&self) -> Option<ByteRange> {
        match self {
            ScanError::Open { range, .. }
            | ScanError::Seek { range, .. }
            | ScanError::Read { range, .. } => Some(*range),
            ScanError::Stat { .. } => None,
        }
    }
}

/// A line without a well-formed `[SEVERITY]` tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MalformedLine {
    #[error("no '[' found")]
    MissingOpen,
    #[error("no ']' after '['")]
    MissingClose,
    #[error("empty severity tag")]
    EmptyTag,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_error_is_limit() {
        let err = WriteError::LimitExceeded { max_size: 10 };
        assert!(err.is_limit());
        assert!(err.to_string().contains("10 bytes"));
        assert!(!WriteError::Closed.is_limit());
    }

    #[test]
    fn test_scan_error_carries_range() {
        let range = ByteRange::new(5, 10);
        let err = ScanError::Open {
            path: PathBuf::from("missing.log"),
            range,
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(err.range(), Some(range));
        assert!(err.to_string().contains("[5, 10)"));
    }
}
