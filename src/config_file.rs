use anyhow::{anyhow, Context, Result};
use std::env;
use std::path::{Path, PathBuf};

use crate::config::parse_size;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "LOGBENCH_CONFIG";

const PROJECT_CONFIG_NAME: &str = ".logbenchrc";

/// `[writer]` section; unset keys keep the built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriterSection {
    pub file: Option<String>,
    pub max_size: Option<u64>,
    pub severities: Option<Vec<String>>,
    pub producers: Option<usize>,
    pub message: Option<String>,
    pub seed: Option<u64>,
}

/// `[scanner]` section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScannerSection {
    pub file: Option<String>,
    pub workers: Option<usize>,
}

/// Configuration file handler for logbench
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub writer: WriterSection,
    pub scanner: ScannerSection,
}

impl ConfigFile {
    /// Find project-level .logbenchrc by walking up directory tree
    pub fn find_project_config() -> Option<PathBuf> {
        let mut current = env::current_dir().ok()?;
        loop {
            let config_path = current.join(PROJECT_CONFIG_NAME);
            if config_path.exists() {
                return Some(config_path);
            }
            if !current.pop() {
                // Reached filesystem root
                break;
            }
        }
        None
    }

    /// User config file locations in order of preference
    pub fn get_user_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("logbench").join("config.ini"));
        }
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(PROJECT_CONFIG_NAME));
        }

        paths
    }

    /// Load configuration with precedence: explicit path > project > user > defaults
    pub fn load() -> Result<(Self, Vec<PathBuf>)> {
        if let Ok(explicit) = env::var(CONFIG_ENV_VAR) {
            let path = PathBuf::from(explicit);
            let config = Self::load_from_path(&path)?;
            return Ok((config, vec![path]));
        }

        let mut config = Self::default();
        let mut loaded = Vec::new();

        // User config first (lowest precedence)
        if let Some(path) = Self::get_user_config_paths()
            .into_iter()
            .find(|p| p.exists())
        {
            config = Self::merge_configs(config, Self::load_from_path(&path)?);
            loaded.push(path);
        }

        if let Some(path) = Self::find_project_config() {
            config = Self::merge_configs(config, Self::load_from_path(&path)?);
            loaded.push(path);
        }

        Ok((config, loaded))
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse_ini_content(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parse INI content from string
    pub fn parse_ini_content(content: &str) -> Result<Self> {
        let mut config = Self::default();
        let mut current_section = String::new();

        for (idx, line) in content.lines().enumerate() {
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                current_section = line[1..line.len() - 1].trim().to_string();
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(anyhow!("line {}: expected key = value", idx + 1));
            };
            let (key, value) = (key.trim(), value.trim());

            config
                .apply(&current_section, key, value)
                .with_context(|| format!("line {}: [{}] {}", idx + 1, current_section, key))?;
        }

        Ok(config)
    }

    fn apply(&mut self, section: &str, key: &str, value: &str) -> Result<()> {
        match (section, key) {
            ("writer", "file") => self.writer.file = Some(value.to_string()),
            ("writer", "max_size") => self.writer.max_size = Some(parse_size(value)?),
            ("writer", "severities") => {
                self.writer.severities = Some(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect(),
                )
            }
            ("writer", "producers") => self.writer.producers = Some(parse_count(value)?),
            ("writer", "message") => self.writer.message = Some(value.to_string()),
            ("writer", "seed") => {
                self.writer.seed = Some(
                    value
                        .parse()
                        .map_err(|_| anyhow!("expected an unsigned integer, got '{}'", value))?,
                )
            }
            ("scanner", "file") => self.scanner.file = Some(value.to_string()),
            ("scanner", "workers") => self.scanner.workers = Some(parse_count(value)?),
            // Ignore unknown sections and keys
            _ => {}
        }
        Ok(())
    }

    /// Merge two configuration objects, with the second taking precedence
    fn merge_configs(base: Self, overlay: Self) -> Self {
        Self {
            writer: WriterSection {
                file: overlay.writer.file.or(base.writer.file),
                max_size: overlay.writer.max_size.or(base.writer.max_size),
                severities: overlay.writer.severities.or(base.writer.severities),
                producers: overlay.writer.producers.or(base.writer.producers),
                message: overlay.writer.message.or(base.writer.message),
                seed: overlay.writer.seed.or(base.writer.seed),
            },
            scanner: ScannerSection {
                file: overlay.scanner.file.or(base.scanner.file),
                workers: overlay.scanner.workers.or(base.scanner.workers),
            },
        }
    }

    /// Show configuration search locations and the example file
    pub fn show_config(loaded: &[PathBuf]) {
        println!("Configuration precedence: ${} > project {} > user config > defaults\n", CONFIG_ENV_VAR, PROJECT_CONFIG_NAME);

        if loaded.is_empty() {
            println!("No configuration files found. Using defaults.");
        } else {
            println!("Configuration loaded from:");
            for path in loaded {
                println!("  {}", path.display());
            }
        }

        println!("\nConfiguration search locations (in precedence order):");
        match Self::find_project_config() {
            Some(path) => println!("  1. Project: {} (found)", path.display()),
            None => println!("  1. Project: {} (searched up directory tree, not found)", PROJECT_CONFIG_NAME),
        }
        for (i, path) in Self::get_user_config_paths().iter().enumerate() {
            let status = if path.exists() { "(found)" } else { "(not found)" };
            println!("  {}. User: {} {}", i + 2, path.display(), status);
        }

        if loaded.is_empty() {
            println!("\nExample configuration file ({}):", PROJECT_CONFIG_NAME);
            println!();
            println!("[writer]");
            println!("file = stress_test.log");
            println!("max_size = 1G");
            println!("severities = INFO, WARN, ERROR, DEBUG");
            println!("producers = 8");
            println!();
            println!("[scanner]");
            println!("workers = 8");
        }
    }
}

fn parse_count(value: &str) -> Result<usize> {
    value
        .parse()
        .map_err(|_| anyhow!("expected a non-negative integer, got '{}'", value))
}
