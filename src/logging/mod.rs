//! Deferred logging: buffer-then-flush for the pre-backend window.
//!
//! ## Contents
//! - [`DeferredLogs`], [`DeferredLogger`] — the switchboard and its named
//!   handles
//! - [`LogSink`], [`TracingSink`], [`LogLevel`] — the backend boundary

mod deferred;
mod sink;

pub use deferred::{DeferredLogger, DeferredLogs};
pub use sink::{LogLevel, LogSink, TracingSink};
