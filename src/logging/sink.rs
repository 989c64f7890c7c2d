//! Log sink: where deferred lines land once the backend is ready.

use tracing::Level;

/// Severity of a deferred log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Returns a short stable label for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_label())
    }
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

/// Destination for log lines once the real logging backend exists.
///
/// The deferred switchboard replays buffered lines through this trait on
/// switch-over and forwards subsequent lines to it directly. Flushing is
/// expected to be infallible once the backend contract is honored.
pub trait LogSink: Send + Sync + 'static {
    /// Emits one line for the named logger.
    fn log(&self, logger: &str, level: LogLevel, message: &str, error: Option<&str>);
}

/// [`LogSink`] that forwards to the `tracing` backbone.
///
/// The logger name travels as a field because `tracing` targets must be
/// compile-time constants.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, logger: &str, level: LogLevel, message: &str, error: Option<&str>) {
        match level {
            LogLevel::Trace => tracing::trace!(logger, error, "{message}"),
            LogLevel::Debug => tracing::debug!(logger, error, "{message}"),
            LogLevel::Info => tracing::info!(logger, error, "{message}"),
            LogLevel::Warn => tracing::warn!(logger, error, "{message}"),
            LogLevel::Error => tracing::error!(logger, error, "{message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_labels_and_order() {
        assert_eq!(LogLevel::Warn.as_label(), "warn");
        assert!(LogLevel::Trace < LogLevel::Error);
        assert_eq!(Level::from(LogLevel::Info), Level::INFO);
    }
}
