//! Generic logger utility functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use colored::{ColoredString, Colorize};
use log::{self, info, Record};
use std::fmt;
use thiserror::Error;

// Internal imports
use crate::session;

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Expected a log level at least as verbose as `INFO`, found `{0}`")]
    InvalidMinLogLevel(log::LevelFilter),

    #[error("Error initialising the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("An error occured while setting up the logger: {0}")]
    FernInitError(log::SetLoggerError),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
///
/// Messages at `min_level` and above are written to stdout with coloured level tags. The
/// session's log file receives every message down to `Trace` without colour codes. Each line is
/// prefixed with the number of seconds elapsed since the session started.
///
/// # Notes
///
/// - `min_level` must be at least as verbose as `log::Level::Info`.
/// - This function can only be called once per process, later calls return
///   `LoggerInitError::FernInitError`.
pub fn logger_init(
    min_level: LevelFilter,
    session: &session::Session,
) -> Result<(), LoggerInitError> {
    if min_level < log::Level::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(min_level));
    }

    let log_file =
        fern::log_file(&session.log_file_path).map_err(LoggerInitError::LogFileInitError)?;

    let stdout = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}",
                Line::new(message, record, colour_level(record.level()))
            ))
        })
        .level(min_level)
        .chain(std::io::stdout());

    let file = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}",
                Line::new(message, record, plain_level(record.level()))
            ))
        })
        .level(LevelFilter::Trace)
        .chain(log_file);

    fern::Dispatch::new()
        .chain(stdout)
        .chain(file)
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised");
    if let Ok(epoch) = session::get_epoch() {
        info!("    Session epoch: {}", epoch);
    }
    info!("    Log level: {:?}", min_level);
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single formatted log line.
///
/// Debug and trace lines include the module the message came from.
struct Line<'a, L> {
    elapsed_s: f64,
    level: L,
    target: Option<&'a str>,
    message: &'a fmt::Arguments<'a>,
}

impl<'a, L: fmt::Display> Line<'a, L> {
    fn new(message: &'a fmt::Arguments<'a>, record: &'a Record, level: L) -> Self {
        Self {
            elapsed_s: session::get_elapsed_seconds(),
            level,
            target: if record.level() > log::Level::Info {
                Some(record.target())
            } else {
                None
            },
            message,
        }
    }
}

impl<'a, L: fmt::Display> fmt::Display for Line<'a, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:10.6} {}] ", self.elapsed_s, self.level)?;
        if let Some(target) = self.target {
            write!(f, "{}: ", target)?;
        }
        write!(f, "{}", self.message)
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn plain_level(level: log::Level) -> &'static str {
    match level {
        log::Level::Trace => "TRC",
        log::Level::Debug => "DBG",
        log::Level::Info => "INF",
        log::Level::Warn => "WRN",
        log::Level::Error => "ERR",
    }
}

/// Level tag coloured for terminal output
fn colour_level(level: log::Level) -> ColoredString {
    let tag = plain_level(level);
    match level {
        log::Level::Trace => tag.dimmed().italic(),
        log::Level::Debug => tag.dimmed(),
        log::Level::Info => tag.normal(),
        log::Level::Warn => tag.yellow(),
        log::Level::Error => tag.red().bold(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_plain_level() {
        assert_eq!(plain_level(log::Level::Warn), "WRN");
        assert_eq!(plain_level(log::Level::Trace), "TRC");
    }

    fn render(elapsed_s: f64, target: Option<&str>, message: fmt::Arguments) -> String {
        Line {
            elapsed_s,
            level: "INF",
            target,
            message: &message,
        }
        .to_string()
    }

    #[test]
    fn test_line_format() {
        assert_eq!(
            render(1.5, None, format_args!("hello {}", 3)),
            "[  1.500000 INF] hello 3"
        );
        assert_eq!(
            render(0.25, Some("survey_lib::tour"), format_args!("moved")),
            "[  0.250000 INF] survey_lib::tour: moved"
        );
    }
}
