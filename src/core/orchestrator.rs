//! # Orchestrator: drives the bootstrap phase sequence.
//!
//! The host bootstrap calls one entry point per phase, in order. Each call
//! opens an instrumentation step, broadcasts the phase event, and returns
//! only when every matching observer has completed (or a fail-fast error
//! aborted the dispatch).
//!
//! ## Routing
//! ```text
//! starting ──────────────┐
//! environment_prepared ──┤
//! context_prepared ──────┼──► initial EventMulticaster
//! context_loaded ────────┘    (observers also attached to the context bus
//!                              before the ContextLoaded broadcast)
//! started ───────────────┐
//! running ───────────────┼──► context bus (RuntimeContext::publish)
//! failed ────────────────┘    context bus when active + multicaster wired,
//!                              else initial multicaster, contained
//! ```
//!
//! The orchestrator holds no phase-tracking state: ordering correctness is
//! the caller's responsibility. One phase call fully completes before the
//! next may begin; observers are never invoked concurrently by this core.
//! Nothing here is cancellable or has a timeout — a hanging observer hangs
//! the bootstrap.

use crate::error::BootError;
use crate::events::{BootFailure, Event, EventMulticaster, Phase};
use crate::handles::{BootstrapHandle, ContextRef, EnvironmentRef};
use crate::startup::StartupRef;

use super::builder::OrchestratorBuilder;

/// Single entry point for the host's bootstrap phase calls.
pub struct Orchestrator {
    multicaster: EventMulticaster,
    startup: StartupRef,
}

impl Orchestrator {
    /// Starts building an orchestrator.
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::new()
    }

    pub(crate) fn new_internal(multicaster: EventMulticaster, startup: StartupRef) -> Self {
        Self {
            multicaster,
            startup,
        }
    }

    /// The initial observer registry, in dispatch order.
    pub fn observers(&self) -> &[crate::observers::ObserverRef] {
        self.multicaster.observers()
    }

    /// Announces `Starting`. Tags the step with the main-class identifier
    /// when the host supplies one.
    pub async fn starting(
        &self,
        bootstrap: BootstrapHandle,
        main_class: Option<&str>,
    ) -> Result<(), BootError> {
        let mut step = self.startup.start(Phase::Starting.step_name());
        if let Some(main) = main_class {
            step.tag("main-class", main.to_string());
        }
        let result = self
            .multicaster
            .dispatch(&Event::starting(bootstrap, main_class))
            .await;
        step.end();
        result
    }

    /// Announces `EnvironmentPrepared`: the environment exists and is
    /// ready for mutation.
    pub async fn environment_prepared(
        &self,
        bootstrap: BootstrapHandle,
        environment: EnvironmentRef,
    ) -> Result<(), BootError> {
        self.broadcast(Event::environment_prepared(bootstrap, environment))
            .await
    }

    /// Announces `ContextPrepared`: the runtime context exists but has not
    /// been loaded.
    pub async fn context_prepared(&self, context: ContextRef) -> Result<(), BootError> {
        self.broadcast(Event::context_prepared(context)).await
    }

    /// Announces `ContextLoaded`: the application is fully assembled.
    ///
    /// Before broadcasting, every initial observer is offered the context
    /// (`attach_context`) and attached to the context's own event bus, so
    /// events the context re-publishes later reach them too.
    pub async fn context_loaded(&self, context: ContextRef) -> Result<(), BootError> {
        for observer in self.multicaster.observers() {
            observer.attach_context(&context);
            context.add_observer(observer.clone());
        }
        self.broadcast(Event::context_loaded(context)).await
    }

    /// Announces `Started` through the context's own bus.
    pub async fn started(&self, context: ContextRef) -> Result<(), BootError> {
        let step = self.startup.start(Phase::Started.step_name());
        let result = context.publish(&Event::started(context.clone())).await;
        step.end();
        result
    }

    /// Announces `Running` through the context's own bus. Terminal for the
    /// happy path.
    pub async fn running(&self, context: ContextRef) -> Result<(), BootError> {
        let step = self.startup.start(Phase::Running.step_name());
        let result = context.publish(&Event::running(context.clone())).await;
        step.end();
        result
    }

    /// Announces the terminal `Failed` phase, with per-observer failure
    /// containment.
    ///
    /// Routes through the context bus when the context is present, active,
    /// and reports its primary multicaster wired; otherwise falls back to
    /// the initial multicaster. Either way an observer failure is contained
    /// (logged, never re-raised) as long as `error` is present; a missing
    /// `error` is a caller contract violation, and handler errors then
    /// propagate as-is.
    pub async fn failed(
        &self,
        context: Option<ContextRef>,
        error: Option<BootFailure>,
    ) -> Result<(), BootError> {
        let mut step = self.startup.start(Phase::Failed.step_name());
        if let Some(cause) = &error {
            step.tag("exception", format!("{cause:?}"));
            step.tag("message", cause.to_string());
        }

        let had_error = error.is_some();
        let event = Event::failed(context.clone(), error);
        let result = match context {
            Some(context) if context.is_active() && context.multicaster_ready() => {
                // Observers were attached to the context at ContextLoaded,
                // so its bus reaches them all.
                match context.publish(&event).await {
                    Err(failure) if had_error => {
                        contain(&failure);
                        Ok(())
                    }
                    other => other,
                }
            }
            _ => self.multicaster.dispatch_contained(&event).await,
        };
        step.end();
        result
    }

    async fn broadcast(&self, event: Event) -> Result<(), BootError> {
        let step = self.startup.start(event.phase.step_name());
        let result = self.multicaster.dispatch(&event).await;
        step.end();
        result
    }
}

fn contain(failure: &BootError) {
    if tracing::enabled!(tracing::Level::DEBUG) {
        tracing::error!(error = %failure, "error handling failed event");
    } else {
        tracing::warn!("error handling failed event ({})", failure.as_message());
    }
}
