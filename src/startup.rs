//! # Startup instrumentation.
//!
//! Every phase broadcast is wrapped in a named, taggable [`StartupStep`]
//! so hosts can record where bootstrap time goes. The recorder is
//! pluggable; the default is [`NoopStartup`], which costs nothing.
//!
//! Step names follow the phase (`bootvisor.starting`,
//! `bootvisor.environment-prepared`, ...). The orchestrator tags the
//! `Starting` step with the main-class identifier when present, and the
//! `Failed` step with the causing error's detail and message.

use std::sync::Arc;

/// Instrumentation recorder wrapping each phase broadcast in a step.
pub trait Startup: Send + Sync + 'static {
    /// Opens a step. The caller tags it and ends it after the broadcast.
    fn start(&self, name: &'static str) -> Box<dyn StartupStep>;
}

/// One named, taggable span around a phase broadcast.
pub trait StartupStep: Send {
    /// Attaches a key/value tag to the step.
    fn tag(&mut self, key: &'static str, value: String);

    /// Closes the step.
    fn end(self: Box<Self>);
}

/// Shared handle to a [`Startup`] recorder.
pub type StartupRef = Arc<dyn Startup>;

/// Recorder that does nothing. The default.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopStartup;

impl Startup for NoopStartup {
    fn start(&self, _name: &'static str) -> Box<dyn StartupStep> {
        Box::new(NoopStep)
    }
}

struct NoopStep;

impl StartupStep for NoopStep {
    fn tag(&mut self, _key: &'static str, _value: String) {}

    fn end(self: Box<Self>) {}
}

/// Recorder that emits `tracing` debug events on step open and close.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingStartup;

impl Startup for TracingStartup {
    fn start(&self, name: &'static str) -> Box<dyn StartupStep> {
        tracing::debug!(step = name, "step open");
        Box::new(TracingStep {
            name,
            tags: Vec::new(),
        })
    }
}

struct TracingStep {
    name: &'static str,
    tags: Vec<(&'static str, String)>,
}

impl StartupStep for TracingStep {
    fn tag(&mut self, key: &'static str, value: String) {
        self.tags.push((key, value));
    }

    fn end(self: Box<Self>) {
        tracing::debug!(step = self.name, tags = ?self.tags, "step close");
    }
}
