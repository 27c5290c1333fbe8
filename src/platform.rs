use anyhow::Result;
use std::io::{self, Write};
use std::process;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::thread;

#[cfg(unix)]
use signal_hook::{consts::SIGINT, consts::SIGPIPE, consts::SIGTERM, iterator::Signals};

#[cfg(windows)]
use signal_hook::{consts::SIGINT, flag};

/// Standard Unix exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    InvalidUsage = 2,
    SignalInt = 130,  // 128 + SIGINT (2)
    SignalPipe = 141, // 128 + SIGPIPE (13)
    SignalTerm = 143, // 128 + SIGTERM (15)
}

impl ExitCode {
    pub fn exit(self) -> ! {
        process::exit(self as i32)
    }

    /// Exit code for a run stopped by `signal`
    pub fn for_signal(signal: i32) -> Self {
        #[cfg(unix)]
        if signal == SIGTERM {
            return ExitCode::SignalTerm;
        }
        let _ = signal;
        ExitCode::SignalInt
    }

    /// Exit code for a run stopped by the signal recorded in `TERMINATING_SIGNAL`
    pub fn for_interrupt() -> Self {
        Self::for_signal(TERMINATING_SIGNAL.load(Ordering::Relaxed))
    }
}

/// Raised on the first SIGINT/SIGTERM; producers poll it between lines
pub static SHOULD_TERMINATE: AtomicBool = AtomicBool::new(false);
/// Number of the first signal that raised `SHOULD_TERMINATE`, 0 if none
pub static TERMINATING_SIGNAL: AtomicI32 = AtomicI32::new(0);

fn request_shutdown(signal: i32) {
    let _ = TERMINATING_SIGNAL.compare_exchange(0, signal, Ordering::Relaxed, Ordering::Relaxed);
    SHOULD_TERMINATE.store(true, Ordering::Relaxed);
}

/// Signal handler for graceful shutdown
pub struct SignalHandler {
    _handle: thread::JoinHandle<()>,
}

impl SignalHandler {
    /// The first interrupt asks producers to stop; a second one exits immediately
    pub fn new() -> Result<Self> {
        #[cfg(unix)]
        {
            let mut signals = Signals::new([SIGINT, SIGPIPE, SIGTERM])?;

            let handle = thread::spawn(move || {
                let mut shutdown_count = 0;
                for sig in signals.forever() {
                    match sig {
                        SIGINT | SIGTERM => {
                            shutdown_count += 1;
                            request_shutdown(sig);
                            if shutdown_count > 1 {
                                ExitCode::for_signal(sig).exit();
                            }
                            tracing::warn!(signal = sig, "termination requested, stopping producers");
                        }
                        SIGPIPE => {
                            // Broken pipe - exit quietly (normal for Unix pipes)
                            request_shutdown(sig);
                            ExitCode::SignalPipe.exit();
                        }
                        _ => {
                            tracing::warn!(signal = sig, "received unexpected signal");
                        }
                    }
                }
            });

            Ok(SignalHandler { _handle: handle })
        }

        #[cfg(windows)]
        {
            // Flag-based polling: the iterator API is unix-only
            let term_flag = std::sync::Arc::new(AtomicBool::new(false));
            flag::register(SIGINT, std::sync::Arc::clone(&term_flag))?;

            let handle = thread::spawn(move || {
                let mut shutdown_count = 0;
                loop {
                    thread::sleep(std::time::Duration::from_millis(100));
                    if term_flag.swap(false, Ordering::Relaxed) {
                        shutdown_count += 1;
                        request_shutdown(SIGINT);
                        if shutdown_count > 1 {
                            ExitCode::SignalInt.exit();
                        }
                        tracing::warn!("interrupt received, stopping producers");
                    }
                }
            });

            Ok(SignalHandler { _handle: handle })
        }
    }
}

/// Safe wrapper for writing to stdout that handles broken pipes and other I/O errors
pub struct SafeStdout {
    stdout: io::Stdout,
}

impl Default for SafeStdout {
    fn default() -> Self {
        Self::new()
    }
}

impl SafeStdout {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
        }
    }

    /// Write a line to stdout, exiting quietly on a broken pipe
    pub fn writeln(&mut self, data: &str) -> Result<()> {
        match writeln!(self.stdout, "{}", data) {
            Ok(()) => Ok(()),
            Err(e) if Self::is_broken_pipe(&e) => ExitCode::SignalPipe.exit(),
            Err(e) => Err(anyhow::anyhow!("Failed to write to stdout: {}", e)),
        }
    }

    pub fn flush(&mut self) -> Result<()> {
        match self.stdout.flush() {
            Ok(()) => Ok(()),
            Err(e) if Self::is_broken_pipe(&e) => ExitCode::SignalPipe.exit(),
            Err(e) => Err(anyhow::anyhow!("Failed to flush stdout: {}", e)),
        }
    }

    /// Cross-platform broken pipe detection
    fn is_broken_pipe(e: &io::Error) -> bool {
        #[cfg(unix)]
        {
            e.kind() == io::ErrorKind::BrokenPipe
        }
        #[cfg(windows)]
        {
            e.kind() == io::ErrorKind::BrokenPipe
                || e.raw_os_error() == Some(232) // ERROR_NO_DATA "The pipe is being closed"
                || e.raw_os_error() == Some(109) // ERROR_BROKEN_PIPE "The pipe has been ended"
        }
    }
}
