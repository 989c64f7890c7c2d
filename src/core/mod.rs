//! Orchestration core: the phase sequence driver.
//!
//! The only public API from this module is [`Orchestrator`] (and its
//! builder), the single entry point the host bootstrap calls once per
//! phase:
//!
//! ```text
//! host bootstrap                 orchestrator                observers
//! ─────────────                  ────────────                ─────────
//! starting() ─────────────────► step open
//!                                dispatch(Starting) ───────► on_event (sorted, sequential)
//!                                step close
//! environment_prepared() ─────► dispatch(EnvironmentPrepared)
//!                                  └─► env post-processing → mutators
//! context_prepared() ─────────► dispatch(ContextPrepared)
//! context_loaded() ───────────► attach observers to context bus
//!                                dispatch(ContextLoaded)
//!                                  └─► deferred logs switch over
//! started() / running() ──────► context bus publish
//! failed() ───────────────────► context bus when wired, else initial
//!                                multicaster, contained per observer
//! ```

mod builder;
mod orchestrator;

pub use builder::OrchestratorBuilder;
pub use orchestrator::Orchestrator;

#[cfg(test)]
pub(crate) mod tests_support {
    //! Shared fakes for the core and observer test modules.

    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use crate::error::BootError;
    use crate::events::{Event, EventMulticaster, Phase};
    use crate::handles::{ContextRef, RuntimeContext};
    use crate::observers::ObserverRef;
    use crate::startup::{Startup, StartupStep};

    /// Runtime context fake: an in-memory event bus plus activation flags.
    pub(crate) struct StubContext {
        active: bool,
        wired: bool,
        observers: Mutex<Vec<ObserverRef>>,
        published: Mutex<Vec<Phase>>,
    }

    impl StubContext {
        pub(crate) fn active() -> Arc<Self> {
            Arc::new(Self {
                active: true,
                wired: true,
                observers: Mutex::new(Vec::new()),
                published: Mutex::new(Vec::new()),
            })
        }

        pub(crate) fn inactive() -> Arc<Self> {
            Arc::new(Self {
                active: false,
                wired: false,
                observers: Mutex::new(Vec::new()),
                published: Mutex::new(Vec::new()),
            })
        }

        pub(crate) fn published(&self) -> Vec<Phase> {
            self.published.lock().unwrap().clone()
        }

        pub(crate) fn observer_count(&self) -> usize {
            self.observers.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl RuntimeContext for StubContext {
        fn is_active(&self) -> bool {
            self.active
        }

        fn multicaster_ready(&self) -> bool {
            self.wired
        }

        async fn publish(&self, event: &Event) -> Result<(), BootError> {
            self.published.lock().unwrap().push(event.phase);
            let observers = self.observers.lock().unwrap().clone();
            let multicaster = EventMulticaster::with_observers(observers);
            if event.phase == Phase::Failed {
                multicaster.dispatch_contained(event).await
            } else {
                multicaster.dispatch(event).await
            }
        }

        fn add_observer(&self, observer: ObserverRef) {
            self.observers.lock().unwrap().push(observer);
        }
    }

    /// An inactive context as an opaque [`ContextRef`].
    pub(crate) fn inactive_context() -> ContextRef {
        StubContext::inactive()
    }

    /// Instrumentation fake capturing closed steps with their tags.
    #[derive(Default)]
    pub(crate) struct RecordingStartup {
        pub(crate) steps: Arc<Mutex<Vec<(&'static str, Vec<(&'static str, String)>)>>>,
    }

    struct RecordingStep {
        name: &'static str,
        tags: Vec<(&'static str, String)>,
        steps: Arc<Mutex<Vec<(&'static str, Vec<(&'static str, String)>)>>>,
    }

    impl Startup for RecordingStartup {
        fn start(&self, name: &'static str) -> Box<dyn StartupStep> {
            Box::new(RecordingStep {
                name,
                tags: Vec::new(),
                steps: Arc::clone(&self.steps),
            })
        }
    }

    impl StartupStep for RecordingStep {
        fn tag(&mut self, key: &'static str, value: String) {
            self.tags.push((key, value));
        }

        fn end(self: Box<Self>) {
            self.steps.lock().unwrap().push((self.name, self.tags));
        }
    }
}
