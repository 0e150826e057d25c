//! Logging backend and structured event logging
//!
//! The library only talks to the `log` facade. Binaries install
//! [`ModuleLogger`], which tags every record with the module subsystem.

use std::io::Write;

use anyhow::Result;
use log::{LevelFilter, Log, Metadata, Record};
use serde_json::json;

use crate::constants::APP_SUBSYSTEM;

/// `log` backend writing one tagged line per record to stderr
#[derive(Debug)]
pub struct ModuleLogger {
    subsystem: String,
    level: LevelFilter,
}

impl ModuleLogger {
    pub fn new(subsystem: impl Into<String>, level: LevelFilter) -> Self {
        Self {
            subsystem: subsystem.into(),
            level,
        }
    }

    /// Install as the global logger
    pub fn install(self) -> Result<()> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self))
            .map_err(|e| anyhow::anyhow!("Failed to set logger: {}", e))?;
        log::set_max_level(level);
        Ok(())
    }

    fn format(&self, record: &Record) -> String {
        format!(
            "{} {} {}: {}",
            chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            self.subsystem,
            level_tag(record.level()),
            record.args()
        )
    }
}

impl Log for ModuleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        // A failing stderr must not take the process down
        let _ = writeln!(std::io::stderr().lock(), "{}", self.format(record));
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// logcat-style single letter level
fn level_tag(level: log::Level) -> char {
    match level {
        log::Level::Error => 'E',
        log::Level::Warn => 'W',
        log::Level::Info => 'I',
        log::Level::Debug => 'D',
        log::Level::Trace => 'V',
    }
}

/// Install the stderr logger with a level picked from CLI flags
pub fn init(verbose: bool, quiet: bool) -> Result<()> {
    let level = if quiet {
        LevelFilter::Error
    } else if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    ModuleLogger::new(APP_SUBSYSTEM, level).install()
}

/// Structured lifecycle events of the config editor
#[derive(Debug, Clone, Copy, Default)]
pub struct EventLogger;

impl EventLogger {
    pub fn log_startup(&self, address: &str, config_path: &std::path::Path) {
        let message = json!({
            "event": "web_config_startup",
            "address": address,
            "config_path": config_path.display().to_string(),
            "pid": std::process::id(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });
        log::info!("WebConfig: Server started on {} | {}", address, message);
    }

    pub fn log_request(&self, request_id: &str, route: &str, status: u16) {
        let message = json!({
            "event": "web_config_request",
            "request_id": request_id,
            "route": route,
            "status": status,
        });
        log::debug!("WebConfig: {} -> {} | {}", route, status, message);
    }

    pub fn log_config_written(&self, request_id: &str, bytes: usize) {
        let message = json!({
            "event": "web_config_written",
            "request_id": request_id,
            "bytes": bytes,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });
        log::info!("WebConfig: config updated | {}", message);
    }

    pub fn log_error(&self, error_message: &str, context: Option<&str>) {
        let message = json!({
            "event": "error",
            "message": error_message,
            "context": context,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });
        log::error!("WebConfig: {} | {}", error_message, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enabled_respects_level() {
        let logger = ModuleLogger::new("Test", LevelFilter::Info);
        let info = Metadata::builder().level(log::Level::Info).build();
        let debug = Metadata::builder().level(log::Level::Debug).build();
        assert!(logger.enabled(&info));
        assert!(!logger.enabled(&debug));
    }

    #[test]
    fn test_format_contains_subsystem_and_level() {
        let logger = ModuleLogger::new("ZygiskFrida", LevelFilter::Debug);
        let line = logger.format(
            &Record::builder()
                .level(log::Level::Error)
                .args(format_args!("config broken"))
                .build(),
        );
        assert!(line.contains("ZygiskFrida E: config broken"), "got: {}", line);
    }
}
