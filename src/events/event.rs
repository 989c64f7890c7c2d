//! # Bootstrap lifecycle events.
//!
//! The [`Phase`] enum names the points of the bootstrap sequence at which
//! one event is broadcast. The [`Event`] struct pairs a phase with the
//! payload handles defined for it; fields not defined for a phase stay
//! `None`.
//!
//! ## Phase sequence
//! ```text
//! Starting → EnvironmentPrepared → ContextPrepared → ContextLoaded
//!          → Started → Running                 (happy path, terminal)
//!
//! Failed                                       (from any state, terminal)
//! ```
//!
//! ## Payload per phase
//! | Phase                 | bootstrap | environment | context   | error |
//! |-----------------------|-----------|-------------|-----------|-------|
//! | `Starting`            | yes       |             |           |       |
//! | `EnvironmentPrepared` | yes       | yes         |           |       |
//! | `ContextPrepared`     |           |             | yes       |       |
//! | `ContextLoaded`       |           |             | yes       |       |
//! | `Started`             |           |             | yes       |       |
//! | `Running`             |           |             | yes       |       |
//! | `Failed`              |           |             | optional  | yes*  |
//!
//! *`Failed` without an error is a caller contract violation; the
//! multicaster surfaces it by rethrowing contained handler errors.

use std::fmt;
use std::sync::Arc;

use crate::handles::{BootstrapHandle, ContextRef, EnvironmentRef};

/// The error that caused bootstrap to fail, as carried by `Failed` events.
pub type BootFailure = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Named point in the bootstrap sequence at which one event is broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Bootstrap begun; nothing prepared yet.
    Starting,
    /// The configuration environment exists and is ready for mutation.
    EnvironmentPrepared,
    /// The runtime context exists but has not been loaded.
    ContextPrepared,
    /// The runtime context is fully assembled (not yet refreshed).
    ContextLoaded,
    /// The runtime context has been refreshed; the application is up.
    Started,
    /// Startup work is complete; the application is serving.
    Running,
    /// Bootstrap failed. Terminal; reachable from any state.
    Failed,
}

impl Phase {
    /// All phases, in happy-path order with `Failed` last.
    pub const ALL: [Phase; 7] = [
        Phase::Starting,
        Phase::EnvironmentPrepared,
        Phase::ContextPrepared,
        Phase::ContextLoaded,
        Phase::Started,
        Phase::Running,
        Phase::Failed,
    ];

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            Phase::Starting => "starting",
            Phase::EnvironmentPrepared => "environment_prepared",
            Phase::ContextPrepared => "context_prepared",
            Phase::ContextLoaded => "context_loaded",
            Phase::Started => "started",
            Phase::Running => "running",
            Phase::Failed => "failed",
        }
    }

    /// Instrumentation step name wrapping this phase's broadcast.
    pub fn step_name(&self) -> &'static str {
        match self {
            Phase::Starting => "bootvisor.starting",
            Phase::EnvironmentPrepared => "bootvisor.environment-prepared",
            Phase::ContextPrepared => "bootvisor.context-prepared",
            Phase::ContextLoaded => "bootvisor.context-loaded",
            Phase::Started => "bootvisor.started",
            Phase::Running => "bootvisor.running",
            Phase::Failed => "bootvisor.failed",
        }
    }

    const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Immutable set of phases, declared by an observer at registration time.
///
/// Observers whose set does not contain an event's phase are skipped in
/// O(1) without invocation.
///
/// # Example
/// ```
/// use bootvisor::{Phase, PhaseSet};
///
/// const MINE: PhaseSet = PhaseSet::of(&[Phase::Starting, Phase::Running]);
/// assert!(MINE.contains(Phase::Starting));
/// assert!(!MINE.contains(Phase::Failed));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseSet(u8);

impl PhaseSet {
    /// The empty set.
    pub const EMPTY: PhaseSet = PhaseSet(0);

    /// Every phase, including `Failed`.
    pub const ALL: PhaseSet = PhaseSet::of(&Phase::ALL);

    /// Builds a set from a slice of phases.
    pub const fn of(phases: &[Phase]) -> Self {
        let mut bits = 0u8;
        let mut i = 0;
        while i < phases.len() {
            bits |= phases[i].bit();
            i += 1;
        }
        PhaseSet(bits)
    }

    /// Returns a copy of this set with `phase` added.
    pub const fn with(self, phase: Phase) -> Self {
        PhaseSet(self.0 | phase.bit())
    }

    /// Whether `phase` is in the set.
    pub const fn contains(self, phase: Phase) -> bool {
        self.0 & phase.bit() != 0
    }

    /// Whether the set is empty.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// One bootstrap lifecycle event: a phase plus the payload defined for it.
///
/// Events are immutable and cheap to clone (every payload is `Arc`-backed).
/// They are constructed by the orchestrator via the per-phase constructors;
/// the struct fields stay readable so observers can pattern-match without
/// accessors.
#[derive(Clone)]
pub struct Event {
    /// The phase this event announces.
    pub phase: Phase,
    /// Bootstrap state (`Starting`, `EnvironmentPrepared`).
    pub bootstrap: Option<BootstrapHandle>,
    /// Mutable configuration environment (`EnvironmentPrepared`).
    pub environment: Option<EnvironmentRef>,
    /// Runtime context (`ContextPrepared` onward; optional for `Failed`).
    pub context: Option<ContextRef>,
    /// Main entry-point identifier, when the host supplied one (`Starting`).
    pub main_class: Option<Arc<str>>,
    /// The causing error (`Failed`).
    pub error: Option<BootFailure>,
}

impl Event {
    fn bare(phase: Phase) -> Self {
        Self {
            phase,
            bootstrap: None,
            environment: None,
            context: None,
            main_class: None,
            error: None,
        }
    }

    /// Event announcing the `Starting` phase.
    pub fn starting(bootstrap: BootstrapHandle, main_class: Option<&str>) -> Self {
        Self {
            bootstrap: Some(bootstrap),
            main_class: main_class.map(Arc::from),
            ..Self::bare(Phase::Starting)
        }
    }

    /// Event announcing the `EnvironmentPrepared` phase.
    pub fn environment_prepared(bootstrap: BootstrapHandle, environment: EnvironmentRef) -> Self {
        Self {
            bootstrap: Some(bootstrap),
            environment: Some(environment),
            ..Self::bare(Phase::EnvironmentPrepared)
        }
    }

    /// Event announcing the `ContextPrepared` phase.
    pub fn context_prepared(context: ContextRef) -> Self {
        Self {
            context: Some(context),
            ..Self::bare(Phase::ContextPrepared)
        }
    }

    /// Event announcing the `ContextLoaded` phase.
    pub fn context_loaded(context: ContextRef) -> Self {
        Self {
            context: Some(context),
            ..Self::bare(Phase::ContextLoaded)
        }
    }

    /// Event announcing the `Started` phase.
    pub fn started(context: ContextRef) -> Self {
        Self {
            context: Some(context),
            ..Self::bare(Phase::Started)
        }
    }

    /// Event announcing the `Running` phase.
    pub fn running(context: ContextRef) -> Self {
        Self {
            context: Some(context),
            ..Self::bare(Phase::Running)
        }
    }

    /// Event announcing the terminal `Failed` phase.
    ///
    /// `error` should always be `Some`; a `None` is treated as a caller
    /// contract violation and changes the containment behavior of the
    /// `Failed` dispatch (handler errors are rethrown instead of logged).
    pub fn failed(context: Option<ContextRef>, error: Option<BootFailure>) -> Self {
        Self {
            context,
            error,
            ..Self::bare(Phase::Failed)
        }
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("phase", &self.phase)
            .field("main_class", &self.main_class)
            .field("error", &self.error.as_ref().map(|e| e.to_string()))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handles::MapEnvironment;

    #[test]
    fn test_phase_set_of_and_contains() {
        let set = PhaseSet::of(&[Phase::Starting, Phase::Running]);
        assert!(set.contains(Phase::Starting));
        assert!(set.contains(Phase::Running));
        assert!(!set.contains(Phase::EnvironmentPrepared));
        assert!(!set.contains(Phase::Failed));
    }

    #[test]
    fn test_phase_set_all_covers_every_phase() {
        for phase in Phase::ALL {
            assert!(PhaseSet::ALL.contains(phase), "{phase} missing from ALL");
        }
        assert!(PhaseSet::EMPTY.is_empty());
    }

    #[test]
    fn test_phase_set_with_is_additive() {
        let set = PhaseSet::EMPTY.with(Phase::Failed);
        assert!(set.contains(Phase::Failed));
        assert!(!set.contains(Phase::Starting));
    }

    #[test]
    fn test_phase_labels_are_stable() {
        assert_eq!(Phase::Starting.as_label(), "starting");
        assert_eq!(Phase::EnvironmentPrepared.as_label(), "environment_prepared");
        assert_eq!(Phase::Failed.step_name(), "bootvisor.failed");
    }

    #[test]
    fn test_event_constructors_set_expected_payloads() {
        let bootstrap = BootstrapHandle::new(());
        let env = MapEnvironment::arc();

        let ev = Event::starting(bootstrap.clone(), Some("demo::Main"));
        assert_eq!(ev.phase, Phase::Starting);
        assert!(ev.bootstrap.is_some());
        assert_eq!(ev.main_class.as_deref(), Some("demo::Main"));
        assert!(ev.environment.is_none());

        let ev = Event::environment_prepared(bootstrap, env);
        assert_eq!(ev.phase, Phase::EnvironmentPrepared);
        assert!(ev.bootstrap.is_some());
        assert!(ev.environment.is_some());

        let ev = Event::failed(None, None);
        assert_eq!(ev.phase, Phase::Failed);
        assert!(ev.context.is_none());
        assert!(ev.error.is_none());
    }
}
