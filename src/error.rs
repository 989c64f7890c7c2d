//! Error types used by the bootvisor orchestrator and observers.
//!
//! This module defines two main error enums:
//!
//! - [`BootError`] — errors surfaced by the orchestration core itself
//!   (dispatch failures, contained observer panics).
//! - [`ObserverError`] — errors raised by individual observers and
//!   environment mutators.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for
//! logging/metrics.

use thiserror::Error;

use crate::events::Phase;

/// # Errors raised by observers and environment mutators.
///
/// These represent failures inside a single observer's reaction to one
/// phase event. How they propagate depends on the phase: fail-fast for
/// non-terminal phases, contained for `Failed` (see [`EventMulticaster`]).
///
/// [`EventMulticaster`]: crate::events::EventMulticaster
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ObserverError {
    /// Observer reaction failed.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// An environment mutator failed during `EnvironmentPrepared`.
    #[error("environment mutator '{mutator}' failed: {error}")]
    Mutator {
        /// Name of the failing mutator.
        mutator: String,
        /// The underlying error message.
        error: String,
    },

    /// The event did not carry the payload the observer's phase contract
    /// requires (caller bug: events are built by the orchestrator).
    #[error("event for {phase} is missing its {payload} payload")]
    MissingPayload {
        /// The phase whose event was malformed.
        phase: Phase,
        /// Name of the absent payload field.
        payload: &'static str,
    },
}

impl ObserverError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use bootvisor::ObserverError;
    ///
    /// let err = ObserverError::Fail { error: "boom".into() };
    /// assert_eq!(err.as_label(), "observer_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ObserverError::Fail { .. } => "observer_failed",
            ObserverError::Mutator { .. } => "mutator_failed",
            ObserverError::MissingPayload { .. } => "missing_payload",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ObserverError::Fail { error } => format!("error: {error}"),
            ObserverError::Mutator { mutator, error } => {
                format!("mutator {mutator}: {error}")
            }
            ObserverError::MissingPayload { phase, payload } => {
                format!("missing payload {payload} for {phase}")
            }
        }
    }
}

/// # Errors produced by the orchestration core.
///
/// These wrap an observer-level failure with enough context (phase name,
/// observer identity) for the host to render a diagnostic.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum BootError {
    /// An observer returned an error while handling a phase event.
    #[error("observer '{observer}' failed during {phase}: {source}")]
    Dispatch {
        /// Name of the failing observer.
        observer: String,
        /// The phase whose dispatch failed.
        phase: Phase,
        /// The observer's own error.
        #[source]
        source: ObserverError,
    },

    /// An observer panicked while handling a phase event. Panics are only
    /// intercepted on the contained `Failed` dispatch path.
    #[error("observer '{observer}' panicked during {phase}: {panic}")]
    Panic {
        /// Name of the panicking observer.
        observer: String,
        /// The phase whose dispatch panicked.
        phase: Phase,
        /// Rendered panic payload.
        panic: String,
    },
}

impl BootError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            BootError::Dispatch { .. } => "dispatch_failed",
            BootError::Panic { .. } => "observer_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            BootError::Dispatch {
                observer,
                phase,
                source,
            } => format!("{phase}: observer {observer}: {}", source.as_message()),
            BootError::Panic {
                observer,
                phase,
                panic,
            } => format!("{phase}: observer {observer} panicked: {panic}"),
        }
    }

    /// The phase during which the error occurred.
    pub fn phase(&self) -> Phase {
        match self {
            BootError::Dispatch { phase, .. } => *phase,
            BootError::Panic { phase, .. } => *phase,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observer_error_labels() {
        let fail = ObserverError::Fail { error: "x".into() };
        let mutator = ObserverError::Mutator {
            mutator: "m".into(),
            error: "y".into(),
        };
        assert_eq!(fail.as_label(), "observer_failed");
        assert_eq!(mutator.as_label(), "mutator_failed");
    }

    #[test]
    fn test_boot_error_carries_phase() {
        let err = BootError::Dispatch {
            observer: "obs".into(),
            phase: Phase::Starting,
            source: ObserverError::Fail { error: "x".into() },
        };
        assert_eq!(err.phase(), Phase::Starting);
        assert_eq!(err.as_label(), "dispatch_failed");
        assert!(err.as_message().contains("obs"));
    }
}
