//! Drives a `BoundedLogWriter` from a fixed pool of producer threads.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::clock::Clock;
use crate::error::WriteError;
use crate::writer::{BoundedLogWriter, IdSource};

/// Producers report progress every this many lines
const PROGRESS_INTERVAL: u64 = 100_000;

/// Why a producer left its loop
#[derive(Debug)]
pub enum StopReason {
    LimitReached,
    Shutdown,
    Failed(WriteError),
    Panicked,
}

#[derive(Debug)]
pub struct ProducerReport {
    pub producer_id: usize,
    pub lines_written: u64,
    pub stop: StopReason,
}

/// Outcome of one pool run
#[derive(Debug)]
pub struct PoolReport {
    pub producers: Vec<ProducerReport>,
    pub elapsed: Duration,
}

impl PoolReport {
    pub fn total_lines(&self) -> u64 {
        self.producers.iter().map(|p| p.lines_written).sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = (usize, &WriteError)> {
        self.producers.iter().filter_map(|p| match &p.stop {
            StopReason::Failed(e) => Some((p.producer_id, e)),
            _ => None,
        })
    }

    pub fn interrupted(&self) -> bool {
        self.producers
            .iter()
            .any(|p| matches!(p.stop, StopReason::Shutdown))
    }
}

/// Pool of producers hammering one writer with no rate limiting
#[derive(Debug, Clone)]
pub struct ProducerPool {
    producers: usize,
    severities: Vec<String>,
    message: String,
    seed: Option<u64>,
}

impl ProducerPool {
    pub fn new(producers: usize, severities: Vec<String>, message: impl Into<String>) -> Self {
        Self {
            producers: producers.max(1),
            severities,
            message: message.into(),
            seed: None,
        }
    }

    /// Seed each producer's severity choice (producer `i` uses `seed + i`)
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn producers(&self) -> usize {
        self.producers
    }

    /// Run until every producer has stopped. Producers stop on their own at the
    /// first refused line or storage failure, or when `stop` is raised.
    pub fn run<C: Clock, I: IdSource>(
        &self,
        writer: &BoundedLogWriter<C, I>,
        stop: &AtomicBool,
    ) -> PoolReport {
        let start = Instant::now();

        let mut producers = thread::scope(|scope| {
            let handles: Vec<_> = (0..self.producers)
                .map(|producer_id| {
                    let mut rng = match self.seed {
                        Some(seed) => fastrand::Rng::with_seed(seed.wrapping_add(producer_id as u64)),
                        None => fastrand::Rng::new(),
                    };
                    scope.spawn(move || self.produce(producer_id, writer, stop, &mut rng))
                })
                .collect();

            handles
                .into_iter()
                .enumerate()
                .map(|(producer_id, handle)| {
                    handle.join().unwrap_or_else(|_| {
                        tracing::error!(producer_id, "producer thread panicked");
                        ProducerReport {
                            producer_id,
                            lines_written: 0,
                            stop: StopReason::Panicked,
                        }
                    })
                })
                .collect::<Vec<_>>()
        });
        producers.sort_by_key(|p| p.producer_id);

        PoolReport {
            producers,
            elapsed: start.elapsed(),
        }
    }

    fn produce<C: Clock, I: IdSource>(
        &self,
        producer_id: usize,
        writer: &BoundedLogWriter<C, I>,
        stop: &AtomicBool,
        rng: &mut fastrand::Rng,
    ) -> ProducerReport {
        let mut lines_written = 0u64;

        let stop_reason = loop {
            if stop.load(Ordering::Relaxed) {
                break StopReason::Shutdown;
            }

            let severity = match rng.choice(self.severities.iter()) {
                Some(severity) => severity,
                // Empty catalog: nothing to write
                None => break StopReason::LimitReached,
            };

            match writer.log(severity, &self.message) {
                Ok(()) => {
                    lines_written += 1;
                    if lines_written % PROGRESS_INTERVAL == 0 {
                        tracing::debug!(producer_id, lines_written, "producer progress");
                    }
                }
                Err(WriteError::LimitExceeded { .. }) => break StopReason::LimitReached,
                Err(e) => break StopReason::Failed(e),
            }
        };

        match &stop_reason {
            StopReason::LimitReached => {
                tracing::info!(producer_id, lines_written, "producer stopped: log file limit reached")
            }
            StopReason::Shutdown => {
                tracing::info!(producer_id, lines_written, "producer stopped: shutdown requested")
            }
            StopReason::Failed(e) => {
                tracing::error!(producer_id, lines_written, error = %e, "producer stopped on write failure")
            }
            StopReason::Panicked => {}
        }

        ProducerReport {
            producer_id,
            lines_written,
            stop: stop_reason,
        }
    }
}
