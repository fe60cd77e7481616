//! Logging infrastructure for txforge
//!
//! Builders log through the `log` facade; this module wires that facade to
//! a configured `env_logger` backend. Initialization is idempotent so
//! library consumers and tests can call it freely.
//!
//! # Security Considerations
//!
//! - Never log private keys; [`KeyHandle`](crate::wallet::KeyHandle)
//!   redacts itself, but raw material must not be formatted here either.
//! - Raw transaction hex is fine to log; it is public the moment it is
//!   broadcast.

use chrono::Local;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Write as IoWrite;
use std::sync::Once;

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    /// Error conditions
    Error,
    /// Warning conditions
    Warn,
    /// Informational messages
    Info,
    /// Debug-level messages
    Debug,
    /// Trace level (very verbose)
    Trace,
}

/// Configuration for the logging system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default log level
    pub level: LogLevel,
    /// Whether to log to console at all
    pub console_logging: bool,
    /// Whether to include timestamps in log messages
    pub include_timestamps: bool,
    /// Whether to include source location in log messages
    pub include_source_location: bool,
    /// Whether to use JSON format for logs (machine-readable)
    pub json_format: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            console_logging: true,
            include_timestamps: true,
            include_source_location: false,
            json_format: false,
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

// Ensure logging is only initialized once
static LOGGING_INIT: Once = Once::new();

/// Initialize the logging system with the given configuration
///
/// Safe to call multiple times; only the first call configures the backend.
pub fn init(config: &LogConfig) -> Result<(), String> {
    let mut result = Ok(());

    let include_timestamps = config.include_timestamps;
    let include_source_location = config.include_source_location;
    let json_format = config.json_format;
    let level = if config.console_logging {
        LevelFilter::from(config.level)
    } else {
        LevelFilter::Off
    };

    LOGGING_INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();
        builder.filter_level(level);

        builder.format(move |buf, record| {
            let timestamp = if include_timestamps {
                Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string()
            } else {
                String::new()
            };

            if json_format {
                let line = json!({
                    "timestamp": timestamp,
                    "level": record.level().to_string(),
                    "target": record.target(),
                    "message": record.args().to_string(),
                });
                writeln!(buf, "{}", line)
            } else {
                if include_timestamps {
                    write!(buf, "{} ", timestamp)?;
                }
                if include_source_location {
                    write!(
                        buf,
                        "[{}:{}] ",
                        record.file().unwrap_or("unknown"),
                        record.line().unwrap_or(0)
                    )?;
                }
                writeln!(buf, "[{}] {}", record.level(), record.args())
            }
        });

        result = builder
            .try_init()
            .map_err(|e| format!("failed to initialize logging: {}", e));
    });

    result
}
