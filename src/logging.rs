//! Logging for addonup
//!
//! Structured logging over the `log` facade: text or JSON entries, written
//! to the console, a file, or both, with independent level filters per
//! destination. Update failures are recovered silently elsewhere, so the
//! log is where the real story of a check/apply cycle lives.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::Local;
use log::{Level, LevelFilter};
use serde::Serialize;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Invalid log format: {}. Valid options: text, json", s)),
        }
    }
}

/// Where log entries go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDestination {
    Console,
    File(PathBuf),
    Both(PathBuf),
}

/// One JSON log entry
#[derive(Debug, Serialize)]
struct JsonEntry<'a> {
    timestamp: String,
    level: String,
    message: &'a str,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub console_level: LevelFilter,
    pub file_level: Option<LevelFilter>,
    pub format: LogFormat,
    pub destination: LogDestination,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            console_level: LevelFilter::Info,
            file_level: None,
            format: LogFormat::Text,
            destination: LogDestination::Console,
        }
    }
}

struct AddonupLogger {
    config: LogConfig,
}

impl AddonupLogger {
    fn timestamp() -> String {
        Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
    }

    fn format_entry(&self, level: Level, message: &str) -> String {
        let timestamp = Self::timestamp();
        match self.config.format {
            LogFormat::Text => {
                format!("{} [{}] {}", timestamp, level.to_string().to_uppercase(), message)
            }
            LogFormat::Json => {
                let entry = JsonEntry {
                    timestamp,
                    level: level.to_string().to_uppercase(),
                    message,
                };
                serde_json::to_string(&entry).unwrap_or_else(|_| message.to_string())
            }
        }
    }

    fn console_enabled(&self, level: Level) -> bool {
        level <= self.config.console_level
    }

    fn file_enabled(&self, level: Level) -> bool {
        self.config.file_level.map(|f| level <= f).unwrap_or(false)
    }

    fn write_console(&self, entry: &str) {
        let _ = writeln!(io::stderr(), "{}", entry);
    }

    fn write_file(&self, entry: &str, path: &PathBuf) {
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| writeln!(file, "{}", entry));
        if let Err(e) = result {
            eprintln!("File logging error for {}: {}", path.display(), e);
        }
    }
}

impl log::Log for AddonupLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.console_enabled(metadata.level()) || self.file_enabled(metadata.level())
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let level = record.level();
        let entry = self.format_entry(level, &record.args().to_string());

        match &self.config.destination {
            LogDestination::Console => {
                if self.console_enabled(level) {
                    self.write_console(&entry);
                }
            }
            LogDestination::File(path) => {
                if self.file_enabled(level) {
                    self.write_file(&entry, path);
                }
            }
            LogDestination::Both(path) => {
                if self.console_enabled(level) {
                    self.write_console(&entry);
                }
                if self.file_enabled(level) {
                    self.write_file(&entry, path);
                }
            }
        }
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}

/// Install the global logger
pub fn init_logger(config: LogConfig) -> Result<()> {
    let max_level = match (config.file_level, config.console_level) {
        (Some(file), console) if file > console => file,
        (_, console) => console,
    };

    log::set_boxed_logger(Box::new(AddonupLogger { config }))
        .context("Failed to set global logger")?;
    log::set_max_level(max_level);
    Ok(())
}

/// Parse a log level name
pub fn parse_log_level(level_str: &str) -> Result<LevelFilter> {
    match level_str.to_lowercase().as_str() {
        "error" => Ok(LevelFilter::Error),
        "warn" => Ok(LevelFilter::Warn),
        "info" => Ok(LevelFilter::Info),
        "debug" => Ok(LevelFilter::Debug),
        "trace" => Ok(LevelFilter::Trace),
        "off" => Ok(LevelFilter::Off),
        _ => Err(anyhow::anyhow!(
            "Invalid log level: {}. Valid levels: error, warn, info, debug, trace, off",
            level_str
        )),
    }
}
