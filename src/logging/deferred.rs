//! # Deferred log switchboard.
//!
//! Startup code runs before the logging backend is configured (one of the
//! observers *is* the log configurator), so early log statements cannot go
//! straight to the backend. [`DeferredLogs`] buffers them per logger name
//! and replays them once, in original emission order, when
//! [`switch_over`](DeferredLogs::switch_over) trips the one-shot gate.
//! After switch-over, new lines route straight through to the sink.
//!
//! ## Gate semantics
//! - `switch_over()` may be called any number of times, from any thread
//!   (the `ContextLoaded` and `Failed` paths both trigger it, and
//!   background observers may race with the main phase sequence).
//! - Only the first call flushes; the transition is a single mutex-guarded
//!   state change, so no line is replayed twice and none is lost.
//! - Flush holds the buffer lock, which keeps per-logger order strict even
//!   against concurrent `record` calls landing mid-flush.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use super::sink::{LogLevel, LogSink, TracingSink};

/// One buffered log statement.
struct Line {
    logger: Arc<str>,
    level: LogLevel,
    message: String,
    error: Option<String>,
}

struct Buffer {
    /// One-shot gate; authoritative (the atomic is only a fast path).
    switched: bool,
    /// Buffered lines in global emission order, which preserves the
    /// per-logger order the contract requires.
    lines: Vec<Line>,
}

/// Buffer-then-flush switchboard for startup-time log statements.
///
/// Cheap to share: wrap in an [`Arc`] and hand [`logger`](Self::logger)
/// handles to whoever needs to log before the backend exists.
pub struct DeferredLogs {
    sink: Arc<dyn LogSink>,
    switched: AtomicBool,
    buffer: Mutex<Buffer>,
}

impl Default for DeferredLogs {
    fn default() -> Self {
        Self::new()
    }
}

impl DeferredLogs {
    /// Creates a switchboard that flushes into the `tracing` backbone.
    pub fn new() -> Self {
        Self::with_sink(Arc::new(TracingSink))
    }

    /// Creates a switchboard with a custom sink.
    pub fn with_sink(sink: Arc<dyn LogSink>) -> Self {
        Self {
            sink,
            switched: AtomicBool::new(false),
            buffer: Mutex::new(Buffer {
                switched: false,
                lines: Vec::new(),
            }),
        }
    }

    /// Returns a named logger handle recording through this switchboard.
    pub fn logger(self: &Arc<Self>, name: impl Into<Arc<str>>) -> DeferredLogger {
        DeferredLogger {
            name: name.into(),
            logs: Arc::clone(self),
        }
    }

    /// Records one line: buffered while the gate is unset, forwarded to the
    /// sink directly afterwards.
    pub fn record(
        &self,
        logger: &Arc<str>,
        level: LogLevel,
        message: String,
        error: Option<String>,
    ) {
        if self.switched.load(Ordering::Acquire) {
            self.sink.log(logger, level, &message, error.as_deref());
            return;
        }
        {
            let mut buffer = self.lock();
            if !buffer.switched {
                buffer.lines.push(Line {
                    logger: Arc::clone(logger),
                    level,
                    message,
                    error,
                });
                return;
            }
            // Lost the race against switch_over: the flush already ran
            // under this lock, so forwarding now keeps per-logger order.
        }
        self.sink.log(logger, level, &message, error.as_deref());
    }

    /// Trips the one-shot gate and replays every buffered line exactly
    /// once, in original emission order. Subsequent calls are no-ops.
    pub fn switch_over(&self) {
        let mut buffer = self.lock();
        if buffer.switched {
            return;
        }
        buffer.switched = true;
        for line in buffer.lines.drain(..) {
            self.sink
                .log(&line.logger, line.level, &line.message, line.error.as_deref());
        }
        self.switched.store(true, Ordering::Release);
    }

    /// Whether the gate has tripped.
    pub fn is_switched(&self) -> bool {
        self.switched.load(Ordering::Acquire)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Buffer> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Named logger handle recording through a shared [`DeferredLogs`].
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use bootvisor::DeferredLogs;
///
/// let logs = Arc::new(DeferredLogs::new());
/// let log = logs.logger("config-loader");
/// log.info("profile file found");        // buffered
/// logs.switch_over();                    // replayed through tracing
/// log.info("reload complete");           // straight through
/// ```
#[derive(Clone)]
pub struct DeferredLogger {
    name: Arc<str>,
    logs: Arc<DeferredLogs>,
}

impl DeferredLogger {
    /// The logger name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Records a line at an explicit level.
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        self.logs.record(&self.name, level, message.into(), None);
    }

    /// Records a line with an attached error.
    pub fn log_with(
        &self,
        level: LogLevel,
        message: impl Into<String>,
        error: &(dyn std::error::Error + '_),
    ) {
        self.logs
            .record(&self.name, level, message.into(), Some(error.to_string()));
    }

    /// Records at trace level.
    pub fn trace(&self, message: impl Into<String>) {
        self.log(LogLevel::Trace, message);
    }

    /// Records at debug level.
    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    /// Records at info level.
    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    /// Records at warn level.
    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message);
    }

    /// Records at error level.
    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct CaptureSink {
        lines: StdMutex<Vec<(String, LogLevel, String)>>,
    }

    impl CaptureSink {
        fn lines(&self) -> Vec<(String, LogLevel, String)> {
            self.lines.lock().unwrap().clone()
        }
    }

    impl LogSink for CaptureSink {
        fn log(&self, logger: &str, level: LogLevel, message: &str, _error: Option<&str>) {
            self.lines
                .lock()
                .unwrap()
                .push((logger.to_string(), level, message.to_string()));
        }
    }

    fn switchboard() -> (Arc<DeferredLogs>, Arc<CaptureSink>) {
        let sink = Arc::new(CaptureSink::default());
        let logs = Arc::new(DeferredLogs::with_sink(sink.clone()));
        (logs, sink)
    }

    #[test]
    fn test_buffers_until_switch_over() {
        let (logs, sink) = switchboard();
        let log = logs.logger("early");
        log.info("one");
        log.warn("two");
        assert!(sink.lines().is_empty());

        logs.switch_over();
        let lines = sink.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].2, "one");
        assert_eq!(lines[1].2, "two");
    }

    #[test]
    fn test_per_logger_order_preserved() {
        let (logs, sink) = switchboard();
        let a = logs.logger("a");
        let b = logs.logger("b");
        a.info("a1");
        b.info("b1");
        a.info("a2");
        logs.switch_over();

        let a_lines: Vec<_> = sink
            .lines()
            .into_iter()
            .filter(|(name, _, _)| name == "a")
            .map(|(_, _, msg)| msg)
            .collect();
        assert_eq!(a_lines, vec!["a1", "a2"]);
    }

    #[test]
    fn test_switch_over_is_idempotent() {
        let (logs, sink) = switchboard();
        logs.logger("x").info("only once");
        for _ in 0..5 {
            logs.switch_over();
        }
        assert_eq!(sink.lines().len(), 1);
        assert!(logs.is_switched());
    }

    #[test]
    fn test_record_after_switch_goes_straight_through() {
        let (logs, sink) = switchboard();
        logs.switch_over();
        logs.logger("late").error("direct");
        let lines = sink.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].1, LogLevel::Error);
    }

    #[test]
    fn test_concurrent_switch_over_flushes_exactly_once() {
        let (logs, sink) = switchboard();
        let log = logs.logger("contended");
        for i in 0..100 {
            log.info(format!("line-{i}"));
        }

        let mut joins = Vec::new();
        for _ in 0..8 {
            let logs = Arc::clone(&logs);
            joins.push(std::thread::spawn(move || logs.switch_over()));
        }
        for join in joins {
            join.join().unwrap();
        }

        let lines = sink.lines();
        assert_eq!(lines.len(), 100);
        for (i, (_, _, message)) in lines.iter().enumerate() {
            assert_eq!(message, &format!("line-{i}"));
        }
    }

    #[test]
    fn test_concurrent_records_and_switch_lose_nothing() {
        let (logs, sink) = switchboard();
        let writers: Vec<_> = (0..4)
            .map(|w| {
                let log = logs.logger(format!("writer-{w}"));
                std::thread::spawn(move || {
                    for i in 0..50 {
                        log.info(format!("{i}"));
                    }
                })
            })
            .collect();

        let switcher = {
            let logs = Arc::clone(&logs);
            std::thread::spawn(move || logs.switch_over())
        };

        for writer in writers {
            writer.join().unwrap();
        }
        switcher.join().unwrap();
        logs.switch_over();

        let lines = sink.lines();
        assert_eq!(lines.len(), 200);
        for w in 0..4 {
            let per_writer: Vec<_> = lines
                .iter()
                .filter(|(name, _, _)| name == &format!("writer-{w}"))
                .map(|(_, _, msg)| msg.clone())
                .collect();
            let expected: Vec<_> = (0..50).map(|i| i.to_string()).collect();
            assert_eq!(per_writer, expected, "writer {w} order broken");
        }
    }

    #[test]
    fn test_log_with_attaches_error() {
        #[derive(Default)]
        struct ErrSink {
            errors: StdMutex<Vec<Option<String>>>,
        }
        impl LogSink for ErrSink {
            fn log(&self, _l: &str, _lv: LogLevel, _m: &str, error: Option<&str>) {
                self.errors.lock().unwrap().push(error.map(String::from));
            }
        }

        let sink = Arc::new(ErrSink::default());
        let logs = Arc::new(DeferredLogs::with_sink(sink.clone()));
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        logs.logger("x").log_with(LogLevel::Warn, "write failed", &io);
        logs.switch_over();

        let errors = sink.errors.lock().unwrap();
        assert_eq!(errors.as_slice(), &[Some("disk gone".to_string())]);
    }
}
