/// Structured logging for the race card service
///
/// Provides leveled log lines tagged with the pipeline stage and, where
/// relevant, the state code being processed. Supports console output and
/// an optional append-only log file for export runs.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

use crate::model::RaceDataError;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl LogLevel {
    /// Parses "debug", "info", "warn"/"warning", or "error".
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warning),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline stages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Ingest,
    Shape,
    Export,
    Http,
    System,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Ingest => write!(f, "INGEST"),
            Stage::Shape => write!(f, "SHAPE"),
            Stage::Export => write!(f, "EXPORT"),
            Stage::Http => write!(f, "HTTP"),
            Stage::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console_timestamps,
        };

        // A poisoned lock only means another thread panicked mid-log.
        let mut guard = LOGGER.lock().unwrap_or_else(|e| e.into_inner());
        *guard = Some(logger);
    }

    fn format_entry(level: LogLevel, stage: Stage, state: Option<&str>, message: &str) -> String {
        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        let state_part = state.map(|s| format!(" [{}]", s)).unwrap_or_default();
        format!("{} {} {}{}: {}", timestamp, level, stage, state_part, message)
    }

    fn log(&self, level: LogLevel, stage: Stage, state: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let log_entry = Self::format_entry(level, stage, state, message);
        let state_part = state.map(|s| format!(" [{}]", s)).unwrap_or_default();

        // Console output
        if self.console_timestamps {
            match level {
                LogLevel::Error | LogLevel::Warning => eprintln!("{}", log_entry),
                LogLevel::Info | LogLevel::Debug => println!("{}", log_entry),
            }
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", stage, state_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", stage, state_part, message),
                LogLevel::Info => println!("   {}", message),
                LogLevel::Debug => println!("   [DEBUG]{} {}", state_part, message),
            }
        }

        // File output
        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    Logger::init(min_level, log_file.map(String::from), console_timestamps);
}

fn dispatch(level: LogLevel, stage: Stage, state: Option<&str>, message: &str) {
    let guard = LOGGER.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(logger) = guard.as_ref() {
        logger.log(level, stage, state, message);
    }
}

/// Log a general informational message
pub fn info(stage: Stage, state: Option<&str>, message: &str) {
    dispatch(LogLevel::Info, stage, state, message);
}

/// Log a warning message
pub fn warn(stage: Stage, state: Option<&str>, message: &str) {
    dispatch(LogLevel::Warning, stage, state, message);
}

/// Log an error message
pub fn error(stage: Stage, state: Option<&str>, message: &str) {
    dispatch(LogLevel::Error, stage, state, message);
}

/// Log a debug message
pub fn debug(stage: Stage, state: Option<&str>, message: &str) {
    dispatch(LogLevel::Debug, stage, state, message);
}

// ---------------------------------------------------------------------------
// Structured failure logging
// ---------------------------------------------------------------------------

/// Log a dataset failure at a level matching how actionable it is.
///
/// A state missing from the dataset is routine (territories often have no
/// race record); transport and parse failures are not.
pub fn log_data_failure(state: Option<&str>, operation: &str, err: &RaceDataError) {
    let message = format!("{} failed: {}", operation, err);
    match err {
        RaceDataError::StateNotFound(_) => warn(Stage::Ingest, state, &message),
        RaceDataError::HttpError(_)
        | RaceDataError::RequestFailed(_)
        | RaceDataError::ParseError(_)
        | RaceDataError::Io(_) => error(Stage::Ingest, state, &message),
    }
}

/// Log a summary of an export run
pub fn log_export_summary(total: usize, written: usize, skipped: usize, failed: usize) {
    let message = format!(
        "Export complete: {}/{} cards written, {} states skipped, {} failed",
        written, total, skipped, failed
    );

    if failed == 0 {
        info(Stage::Export, None, &message);
    } else if written == 0 {
        error(Stage::Export, None, &message);
    } else {
        warn(Stage::Export, None, &message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!(LogLevel::parse("DEBUG"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse("warn"), Some(LogLevel::Warning));
        assert_eq!(LogLevel::parse("warning"), Some(LogLevel::Warning));
        assert_eq!(LogLevel::parse("loud"), None);
    }

    #[test]
    fn test_entry_format_includes_stage_and_state() {
        let entry = Logger::format_entry(LogLevel::Warning, Stage::Export, Some("AL"), "skipped");
        assert!(entry.ends_with("WARN EXPORT [AL]: skipped"), "got: {}", entry);
    }

    #[test]
    fn test_entry_format_without_state() {
        let entry = Logger::format_entry(LogLevel::Info, Stage::System, None, "ready");
        assert!(entry.ends_with("INFO SYS: ready"), "got: {}", entry);
    }

    #[test]
    fn test_file_output_appends() {
        let path = std::env::temp_dir().join(format!(
            "race_card_logging_test_{}.log",
            std::process::id()
        ));
        let path_str = path.to_string_lossy().to_string();
        let _ = std::fs::remove_file(&path);

        let logger = Logger {
            min_level: LogLevel::Info,
            log_file: Some(path_str.clone()),
            console_timestamps: false,
        };
        logger.log(LogLevel::Info, Stage::Shape, Some("OH"), "first");
        logger.log(LogLevel::Debug, Stage::Shape, Some("OH"), "filtered out");
        logger.log(LogLevel::Error, Stage::Shape, Some("OH"), "second");

        let contents = std::fs::read_to_string(&path).expect("log file should exist");
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 2, "debug is below the minimum level");
        assert!(lines[0].ends_with("INFO SHAPE [OH]: first"));
        assert!(lines[1].ends_with("ERROR SHAPE [OH]: second"));

        let _ = std::fs::remove_file(&path);
    }
}
