//! Logger initialization.
//!
//! This module provides functions to initialize the logger with custom formatting.

use std::io::{IsTerminal, Write};

use crate::config::LogFormat;
use crate::error_handling::InitializationError;
use colored::*;
use log::LevelFilter;

/// Local wall-clock timestamp used as the prefix of every plain log line.
pub fn log_timestamp() -> String {
    chrono::Local::now()
        .format("%Y-%m-%dT%H:%M:%S%.3f")
        .to_string()
}

/// Formats a plain log line: `<timestamp> <LEVEL padded to 5> <message>`.
pub fn format_plain_line(timestamp: &str, level: log::Level, message: &str) -> String {
    format!("{} {:<5} {}", timestamp, level, message)
}

/// Writes a fatal error line to stderr, bypassing the logger.
///
/// Used for configuration errors that may occur before the logger exists.
pub fn print_fatal_error(message: &str) {
    eprintln!(
        "{}",
        format_plain_line(&log_timestamp(), log::Level::Error, message)
    );
}

/// Initializes the logger with the specified level and format.
///
/// Configures `env_logger` to write to stdout. The plain format produces
/// `<timestamp> INFO  <message>` lines, with the level colored when stdout is a
/// terminal. The JSON format emits one object per line.
///
/// The logger reads from the `RUST_LOG` environment variable by default, but
/// the provided `level` parameter will override it.
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already installed.
///
/// # Examples
///
/// ```bash
/// # Per-module filtering via RUST_LOG
/// RUST_LOG=http_loadgen=debug,reqwest=info http_loadgen --url=http://localhost/
/// ```
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    colored::control::set_override(std::io::stdout().is_terminal());

    // Read from RUST_LOG environment variable first, then override with CLI arg
    let mut builder = env_logger::Builder::from_default_env();

    builder.filter_level(level);
    builder.filter_module("reqwest", LevelFilter::Info);
    builder.filter_module("hyper", LevelFilter::Info);
    builder.filter_module("hyper_util", LevelFilter::Info);
    builder.filter_module("h2", LevelFilter::Warn);
    builder.filter_module("http_loadgen", level);
    builder.target(env_logger::Target::Stdout);

    match format {
        LogFormat::Json => {
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "{{\"ts\":{},\"level\":\"{}\",\"target\":\"{}\",\"msg\":{}}}",
                    chrono::Utc::now().timestamp_millis(),
                    record.level(),
                    record.target(),
                    serde_json::to_string(&record.args().to_string())
                        .unwrap_or_else(|_| "\"\"".into())
                )
            });
        }
        LogFormat::Plain => {
            builder.format(|buf, record| {
                let level = record.level();
                let padded = format!("{:<5}", level);
                let padded = padded.as_str();
                let colored_level = match level {
                    log::Level::Error => padded.red(),
                    log::Level::Warn => padded.yellow(),
                    log::Level::Info => padded.green(),
                    log::Level::Debug => padded.blue(),
                    log::Level::Trace => padded.purple(),
                };

                writeln!(buf, "{} {} {}", log_timestamp(), colored_level, record.args())
            });
        }
    }

    // try_init() so a second initialization (e.g. in tests) is an error, not a panic
    builder.try_init().map_err(InitializationError::from)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_plain_line_pads_level() {
        let line = format_plain_line("2024-01-01T00:00:00.000", log::Level::Info, "Succeeded: 3 req/sec");
        assert_eq!(line, "2024-01-01T00:00:00.000 INFO  Succeeded: 3 req/sec");

        let line = format_plain_line("2024-01-01T00:00:00.000", log::Level::Error, "boom");
        assert_eq!(line, "2024-01-01T00:00:00.000 ERROR boom");
    }

    #[test]
    fn test_log_timestamp_shape() {
        let ts = log_timestamp();
        // e.g. 2024-01-01T12:34:56.789
        assert_eq!(ts.len(), 23, "Unexpected timestamp {ts}");
        assert_eq!(&ts[10..11], "T");
        assert!(chrono::NaiveDateTime::parse_from_str(&ts, "%Y-%m-%dT%H:%M:%S%.3f").is_ok());
    }

    #[test]
    fn test_second_logger_init_is_an_error() {
        // The first call may or may not win depending on test order; the second never can
        let _ = init_logger_with(LevelFilter::Info, LogFormat::Plain);
        let second = init_logger_with(LevelFilter::Info, LogFormat::Json);
        assert!(matches!(second, Err(InitializationError::LoggerError(_))));
    }
}
