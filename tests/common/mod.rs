// tests/common/mod.rs
// Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use logbench::clock::FixedClock;
use logbench::line::LogLine;
use logbench::writer::{BoundedLogWriter, IdSource};

pub const FIXED_TS: &str = "2024-01-01 00:00:00";

/// Producer-id source that always yields the same id, so line lengths are fixed
pub struct ConstId(pub u32);

impl IdSource for ConstId {
    fn next_id(&self) -> u32 {
        self.0
    }
}

/// Writer with a fixed clock and fixed producer-id
pub fn fixed_writer(path: &Path, max_size: u64) -> BoundedLogWriter<FixedClock, ConstId> {
    BoundedLogWriter::open_with_ids(path, max_size, FixedClock::new(FIXED_TS), ConstId(7))
        .expect("Failed to open writer")
}

/// Serialized length of a line produced by `fixed_writer`
pub fn fixed_line_len(severity: &str, message: &str) -> u64 {
    LogLine {
        timestamp: FIXED_TS,
        severity,
        producer_id: 7,
        message,
    }
    .serialize()
    .len() as u64
}

/// Write a config file into `dir` and return its path
pub fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("logbench.ini");
    fs::write(&path, content).expect("Failed to write config file");
    path
}

/// Run the logbench binary in `dir` with an explicit config file
pub fn run_logbench(args: &[&str], dir: &Path, config: &Path) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_logbench"))
        .args(args)
        .current_dir(dir)
        .env("LOGBENCH_CONFIG", config)
        .env("LOGBENCH_LOG", "logbench=warn")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to execute logbench");

    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.code().unwrap_or(-1),
    )
}
