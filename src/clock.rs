//! Cached wall-clock timestamp shared by every log producer.
//!
//! Formatting a timestamp per line is the most expensive part of building a
//! line, so a single background thread formats it once per second and
//! publishes it through an `ArcSwap`. Readers only bump a refcount.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use arc_swap::ArcSwap;
use chrono::Local;
use crossbeam_channel::{bounded, select, tick, Sender};

/// Second-resolution timestamp layout used in every log line
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Source of the timestamp prefix for log lines
pub trait Clock: Send + Sync {
    fn current(&self) -> Arc<String>;
}

pub fn format_now() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Clock backed by a refresh thread; stale by at most one second
pub struct ClockCache {
    current: Arc<ArcSwap<String>>,
    stop_tx: Option<Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl ClockCache {
    pub fn start() -> Self {
        Self::with_interval(REFRESH_INTERVAL)
    }

    pub(crate) fn with_interval(interval: Duration) -> Self {
        let current = Arc::new(ArcSwap::from_pointee(format_now()));
        let (stop_tx, stop_rx) = bounded::<()>(0);

        let published = Arc::clone(&current);
        let handle = thread::spawn(move || {
            let ticker = tick(interval);
            loop {
                select! {
                    recv(ticker) -> _ => {
                        published.store(Arc::new(format_now()));
                    }
                    // Sender dropped on shutdown
                    recv(stop_rx) -> _ => break,
                }
            }
        });

        Self {
            current,
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        }
    }

    /// Stop the refresh thread and wait for it. Safe to call more than once.
    pub fn shutdown(&mut self) {
        drop(self.stop_tx.take());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("clock refresh thread panicked");
            }
        }
    }
}

impl Clock for ClockCache {
    fn current(&self) -> Arc<String> {
        self.current.load_full()
    }
}

impl Drop for ClockCache {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Clock that always reports the same instant
#[derive(Debug, Clone)]
pub struct FixedClock(Arc<String>);

impl FixedClock {
    pub fn new(timestamp: &str) -> Self {
        Self(Arc::new(timestamp.to_string()))
    }
}

impl Clock for FixedClock {
    fn current(&self) -> Arc<String> {
        Arc::clone(&self.0)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn current(&self) -> Arc<String> {
        (**self).current()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn current(&self) -> Arc<String> {
        (**self).current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    #[test]
    fn test_cached_timestamp_is_parseable() {
        let clock = ClockCache::start();
        let ts = clock.current();
        assert!(NaiveDateTime::parse_from_str(&ts, TIMESTAMP_FORMAT).is_ok());
        assert!(!ts.contains('[') && !ts.contains(']'));
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let mut clock = ClockCache::start();
        clock.shutdown();
        assert!(clock.handle.is_none());
        clock.shutdown();
        // Still readable after the thread is gone
        assert!(!clock.current().is_empty());
    }

    #[test]
    fn test_refresh_thread_republishes() {
        let clock = ClockCache::with_interval(Duration::from_millis(5));
        clock.current.store(Arc::new("stale".to_string()));
        let mut refreshed = false;
        for _ in 0..200 {
            thread::sleep(Duration::from_millis(5));
            if clock.current().as_str() != "stale" {
                refreshed = true;
                break;
            }
        }
        assert!(refreshed);
    }

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock::new("2024-01-01 00:00:00");
        assert_eq!(clock.current().as_str(), "2024-01-01 00:00:00");
        let shared: Arc<FixedClock> = Arc::new(clock);
        assert_eq!(shared.current().as_str(), "2024-01-01 00:00:00");
    }
}
