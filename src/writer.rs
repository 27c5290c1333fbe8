//! Size-capped, thread-safe append-only log writer.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::clock::Clock;
use crate::error::WriteError;
use crate::line::LogLine;

/// Producer-ids are drawn from `0..PRODUCER_ID_RANGE`
pub const PRODUCER_ID_RANGE: u32 = 100_000;

const WRITE_BUFFER_SIZE: usize = 1024 * 1024;

/// Source of the per-call producer-id
pub trait IdSource: Send + Sync {
    fn next_id(&self) -> u32;
}

/// Thread-local `fastrand` generator; no shared state between producers
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandomIds;

impl IdSource for ThreadRandomIds {
    fn next_id(&self) -> u32 {
        fastrand::u32(0..PRODUCER_ID_RANGE)
    }
}

/// Seeded generator for reproducible output
#[derive(Debug)]
pub struct SeededIds(Mutex<fastrand::Rng>);

impl SeededIds {
    pub fn new(seed: u64) -> Self {
        Self(Mutex::new(fastrand::Rng::with_seed(seed)))
    }
}

impl IdSource for SeededIds {
    fn next_id(&self) -> u32 {
        let mut rng = self.0.lock().unwrap_or_else(|e| e.into_inner());
        rng.u32(0..PRODUCER_ID_RANGE)
    }
}

struct WriterState {
    /// `None` once closed
    sink: Option<BufWriter<File>>,
    current_size: u64,
    lines_written: u64,
    exhausted: bool,
    /// Set by the first storage failure; nothing is written afterwards
    failed: bool,
}

/// Appends log lines from any number of threads without exceeding `max_size`
pub struct BoundedLogWriter<C: Clock, I: IdSource = ThreadRandomIds> {
    path: PathBuf,
    max_size: u64,
    clock: C,
    ids: I,
    state: Mutex<WriterState>,
}

impl<C: Clock> BoundedLogWriter<C, ThreadRandomIds> {
    pub fn open(path: impl AsRef<Path>, max_size: u64, clock: C) -> Result<Self, WriteError> {
        Self::open_with_ids(path, max_size, clock, ThreadRandomIds)
    }
}

impl<C: Clock, I: IdSource> BoundedLogWriter<C, I> {
    /// Open `path` for appending. Existing content counts against the budget.
    pub fn open_with_ids(
        path: impl AsRef<Path>,
        max_size: u64,
        clock: C,
        ids: I,
    ) -> Result<Self, WriteError> {
        let path = path.as_ref().to_path_buf();
        let storage = |source| WriteError::Storage {
            path: path.clone(),
            source,
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(storage)?;
        let current_size = file.metadata().map_err(storage)?.len();

        tracing::debug!(
            path = %path.display(),
            current_size,
            max_size,
            "opened bounded log writer"
        );

        Ok(Self {
            path,
            max_size,
            clock,
            ids,
            state: Mutex::new(WriterState {
                sink: Some(BufWriter::with_capacity(WRITE_BUFFER_SIZE, file)),
                current_size,
                lines_written: 0,
                exhausted: current_size > max_size,
                failed: false,
            }),
        })
    }

    /// Append one line, or refuse if it would not fit in the remaining budget
    pub fn log(&self, severity: &str, message: &str) -> Result<(), WriteError> {
        let timestamp = self.clock.current();
        let line = LogLine {
            timestamp: &timestamp,
            severity,
            producer_id: self.ids.next_id(),
            message,
        }
        .serialize();
        let line_size = line.len() as u64;

        let mut state = self.lock_state();
        if state.failed {
            return Err(WriteError::Failed);
        }
        if state.exhausted || state.current_size + line_size > self.max_size {
            state.exhausted = true;
            return Err(WriteError::LimitExceeded {
                max_size: self.max_size,
            });
        }

        let sink = state.sink.as_mut().ok_or(WriteError::Closed)?;
        if let Err(source) = sink.write_all(line.as_bytes()) {
            // Bytes may have reached the file uncounted; stop appending for good
            state.failed = true;
            if let Some(sink) = state.sink.take() {
                // Discard the buffer without a flush retry
                let _ = sink.into_parts();
            }
            tracing::error!(path = %self.path.display(), error = %source, "log writer failed");
            return Err(WriteError::Storage {
                path: self.path.clone(),
                source,
            });
        }

        state.current_size += line_size;
        state.lines_written += 1;
        Ok(())
    }

    /// Flush and release the file. Later calls are no-ops, and so is a call
    /// after a storage failure, which has already released the file.
    pub fn close(&self) -> Result<(), WriteError> {
        let sink = self.lock_state().sink.take();
        match sink {
            Some(mut sink) => sink.flush().map_err(|source| WriteError::Storage {
                path: self.path.clone(),
                source,
            }),
            None => Ok(()),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.lock_state().sink.is_none()
    }

    /// Bytes accepted so far, including content present before opening
    pub fn current_size(&self) -> u64 {
        self.lock_state().current_size
    }

    pub fn lines_written(&self) -> u64 {
        self.lock_state().lines_written
    }

    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // Every mutation leaves the state consistent, so a poisoned lock is safe to reuse
    fn lock_state(&self) -> MutexGuard<'_, WriterState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<C: Clock, I: IdSource> Drop for BoundedLogWriter<C, I> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::error!(error = %e, "failed to flush log writer on drop");
        }
    }
}
