use std::path::PathBuf;

use anyhow::{anyhow, Result};

use crate::config_file::ConfigFile;
use crate::line::validate_severity;

pub const DEFAULT_LOG_FILE: &str = "stress_test.log";
pub const DEFAULT_MAX_SIZE: u64 = 1024 * 1024 * 1024;
pub const DEFAULT_MESSAGE: &str = "This is a log message content";
pub const DEFAULT_SEVERITIES: [&str; 4] = ["INFO", "WARN", "ERROR", "DEBUG"];

/// Main configuration struct for logbench
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    pub writer: WriterConfig,
    pub scanner: ScannerConfig,
}

/// Writer-side configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterConfig {
    pub file_path: PathBuf,
    pub max_size_bytes: u64,
    pub severities: Vec<String>,
    /// 0 means one producer per CPU
    pub producers: usize,
    pub message: String,
    /// Seed for producer-ids and severity choice; random when unset
    pub seed: Option<u64>,
}

/// Scanner-side configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerConfig {
    pub file_path: PathBuf,
    /// 0 means one worker per CPU
    pub workers: usize,
}

impl WriterConfig {
    pub fn effective_producers(&self) -> usize {
        if self.producers == 0 {
            num_cpus::get()
        } else {
            self.producers
        }
    }
}

impl ScannerConfig {
    pub fn effective_workers(&self) -> usize {
        if self.workers == 0 {
            num_cpus::get()
        } else {
            self.workers
        }
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            writer: WriterConfig {
                file_path: PathBuf::from(DEFAULT_LOG_FILE),
                max_size_bytes: DEFAULT_MAX_SIZE,
                severities: DEFAULT_SEVERITIES.iter().map(|s| s.to_string()).collect(),
                producers: 0,
                message: DEFAULT_MESSAGE.to_string(),
                seed: None,
            },
            scanner: ScannerConfig {
                file_path: PathBuf::from(DEFAULT_LOG_FILE),
                workers: 0,
            },
        }
    }
}

impl HarnessConfig {
    /// Defaults overlaid with whatever the config file sets
    pub fn from_file(file: &ConfigFile) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = &file.writer.file {
            config.writer.file_path = PathBuf::from(path);
            // The scanner reads what the writer wrote unless told otherwise
            config.scanner.file_path = PathBuf::from(path);
        }
        if let Some(size) = file.writer.max_size {
            config.writer.max_size_bytes = size;
        }
        if let Some(severities) = &file.writer.severities {
            config.writer.severities = severities.clone();
        }
        if let Some(producers) = file.writer.producers {
            config.writer.producers = producers;
        }
        if let Some(message) = &file.writer.message {
            config.writer.message = message.clone();
        }
        config.writer.seed = file.writer.seed.or(config.writer.seed);

        if let Some(path) = &file.scanner.file {
            config.scanner.file_path = PathBuf::from(path);
        }
        if let Some(workers) = file.scanner.workers {
            config.scanner.workers = workers;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.writer.severities.is_empty() {
            return Err(anyhow!("writer.severities must name at least one severity"));
        }
        for severity in &self.writer.severities {
            validate_severity(severity).map_err(|e| anyhow!("writer.severities: {}", e))?;
        }
        if self.writer.message.contains('\n') {
            return Err(anyhow!("writer.message must be a single line"));
        }
        if self.writer.max_size_bytes == 0 {
            return Err(anyhow!("writer.max_size must be greater than zero"));
        }
        Ok(())
    }
}

/// Parse a byte size such as `1G`, `512M`, `64k` or `1000` (binary units)
pub fn parse_size(value: &str) -> Result<u64> {
    let value = value.trim();
    let split = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    let (digits, suffix) = value.split_at(split);
    let number: u64 = digits
        .parse()
        .map_err(|_| anyhow!("Invalid size '{}': expected a number with optional K/M/G suffix", value))?;

    let multiplier: u64 = match suffix.trim().to_ascii_uppercase().as_str() {
        "" | "B" => 1,
        "K" | "KB" | "KIB" => 1024,
        "M" | "MB" | "MIB" => 1024 * 1024,
        "G" | "GB" | "GIB" => 1024 * 1024 * 1024,
        other => return Err(anyhow!("Invalid size suffix '{}' in '{}'", other, value)),
    };

    number
        .checked_mul(multiplier)
        .ok_or_else(|| anyhow!("Size '{}' is too large", value))
}

/// Human-readable byte count
pub fn format_size(bytes: u64) -> String {
    const UNITS: [(&str, u64); 3] = [("GB", 1 << 30), ("MB", 1 << 20), ("KB", 1 << 10)];
    for (unit, scale) in UNITS {
        if bytes >= scale {
            return format!("{:.2} {}", bytes as f64 / scale as f64, unit);
        }
    }
    format!("{} B", bytes)
}
