//! # Environment post-processing dispatcher.
//!
//! [`EnvironmentPostProcessingObserver`] is the observer that runs the
//! pluggable environment mutators when the environment becomes available,
//! and trips the deferred-log switchboard once the bootstrap reaches a
//! terminal point (fully assembled or failed).
//!
//! ## Phase reactions
//! - `EnvironmentPrepared`: resolve the ordered mutator sequence through
//!   the configured [`MutatorResolver`] and run each mutator sequentially.
//!   Later mutators may depend on earlier mutations (one adds a property
//!   source a later one's own configuration reads), so they must never run
//!   concurrently.
//! - `ContextLoaded` and `Failed`: call
//!   [`DeferredLogs::switch_over`](crate::logging::DeferredLogs::switch_over)
//!   unconditionally — logs flush exactly once whether bootstrap succeeds
//!   or fails, and a failure before `ContextLoaded` still flushes the
//!   buffered diagnostics.
//!
//! Its priority is fixed very high ([`ENV_POST_PROCESSING_PRIORITY`]):
//! environment mutation must happen before anything else reads
//! configuration. That is a design invariant, not an accident of
//! registration order.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ObserverError;
use crate::events::{Event, Phase, PhaseSet};
use crate::handles::{BootstrapHandle, EnvironmentRef};
use crate::logging::DeferredLogs;

use super::observer::{Observer, HIGHEST_PRIORITY};

/// Priority of the environment post-processing dispatcher: nearly first.
pub const ENV_POST_PROCESSING_PRIORITY: i32 = HIGHEST_PRIORITY + 10;

const PHASES: PhaseSet = PhaseSet::of(&[
    Phase::EnvironmentPrepared,
    Phase::ContextLoaded,
    Phase::Failed,
]);

/// Pluggable unit that reads/writes the shared configuration environment
/// during `EnvironmentPrepared`.
#[async_trait]
pub trait EnvironmentMutator: Send + Sync + 'static {
    /// Applies this mutator's changes to the environment.
    async fn mutate(
        &self,
        environment: &EnvironmentRef,
        bootstrap: &BootstrapHandle,
    ) -> Result<(), ObserverError>;

    /// Human-readable name (for logs/error context).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Shared handle to an [`EnvironmentMutator`].
pub type MutatorRef = Arc<dyn EnvironmentMutator>;

/// Resolves the ordered mutator sequence for one bootstrap.
///
/// Stands in for the host's discovery mechanism (out of scope here): it is
/// handed the opaque bootstrap handle, which plays the role of the
/// loader key, plus the shared [`DeferredLogs`] so resolved mutators can
/// log before the backend exists.
pub trait MutatorResolver: Send + Sync + 'static {
    /// Returns the mutators in invocation order.
    fn resolve(&self, bootstrap: &BootstrapHandle, logs: &Arc<DeferredLogs>) -> Vec<MutatorRef>;
}

impl<F> MutatorResolver for F
where
    F: Fn(&BootstrapHandle, &Arc<DeferredLogs>) -> Vec<MutatorRef> + Send + Sync + 'static,
{
    fn resolve(&self, bootstrap: &BootstrapHandle, logs: &Arc<DeferredLogs>) -> Vec<MutatorRef> {
        self(bootstrap, logs)
    }
}

/// Function-backed mutator.
///
/// Wraps a closure that receives owned clones of the environment and
/// bootstrap handles and returns a fresh future per invocation.
///
/// # Example
/// ```
/// use bootvisor::{Environment, MutatorFn, MutatorRef};
///
/// let m: MutatorRef = MutatorFn::arc("defaults", |env, _bootstrap| async move {
///     env.set("server.port", "8080".into());
///     Ok(())
/// });
/// assert_eq!(m.name(), "defaults");
/// ```
pub struct MutatorFn<F> {
    name: &'static str,
    f: F,
}

impl<F, Fut> MutatorFn<F>
where
    F: Fn(EnvironmentRef, BootstrapHandle) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ObserverError>> + Send + 'static,
{
    /// Creates a new function-backed mutator.
    pub fn new(name: &'static str, f: F) -> Self {
        Self { name, f }
    }

    /// Creates the mutator and returns it as a shared handle.
    pub fn arc(name: &'static str, f: F) -> MutatorRef {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> EnvironmentMutator for MutatorFn<F>
where
    F: Fn(EnvironmentRef, BootstrapHandle) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ObserverError>> + Send + 'static,
{
    async fn mutate(
        &self,
        environment: &EnvironmentRef,
        bootstrap: &BootstrapHandle,
    ) -> Result<(), ObserverError> {
        (self.f)(Arc::clone(environment), bootstrap.clone()).await
    }

    fn name(&self) -> &str {
        self.name
    }
}

/// Observer that runs environment mutators and trips the log switch-over.
pub struct EnvironmentPostProcessingObserver {
    resolver: Arc<dyn MutatorResolver>,
    logs: Arc<DeferredLogs>,
}

impl EnvironmentPostProcessingObserver {
    /// Creates the dispatcher with its own deferred-log switchboard.
    pub fn new(resolver: Arc<dyn MutatorResolver>) -> Self {
        Self::with_deferred_logs(resolver, Arc::new(DeferredLogs::new()))
    }

    /// Creates the dispatcher sharing an existing switchboard.
    pub fn with_deferred_logs(resolver: Arc<dyn MutatorResolver>, logs: Arc<DeferredLogs>) -> Self {
        Self { resolver, logs }
    }

    /// The shared switchboard (hand it to whoever must log early).
    pub fn deferred_logs(&self) -> &Arc<DeferredLogs> {
        &self.logs
    }

    async fn on_environment_prepared(&self, event: &Event) -> Result<(), ObserverError> {
        let environment = event
            .environment
            .as_ref()
            .ok_or(ObserverError::MissingPayload {
                phase: event.phase,
                payload: "environment",
            })?;
        let bootstrap = event
            .bootstrap
            .as_ref()
            .ok_or(ObserverError::MissingPayload {
                phase: event.phase,
                payload: "bootstrap",
            })?;

        for mutator in self.resolver.resolve(bootstrap, &self.logs) {
            mutator
                .mutate(environment, bootstrap)
                .await
                .map_err(|err| match err {
                    wrapped @ ObserverError::Mutator { .. } => wrapped,
                    other => ObserverError::Mutator {
                        mutator: mutator.name().to_string(),
                        error: other.to_string(),
                    },
                })?;
        }
        Ok(())
    }
}

#[async_trait]
impl Observer for EnvironmentPostProcessingObserver {
    async fn on_event(&self, event: &Event) -> Result<(), ObserverError> {
        match event.phase {
            Phase::EnvironmentPrepared => self.on_environment_prepared(event).await,
            Phase::ContextLoaded | Phase::Failed => {
                self.logs.switch_over();
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn phases(&self) -> PhaseSet {
        PHASES
    }

    fn priority(&self) -> i32 {
        ENV_POST_PROCESSING_PRIORITY
    }

    fn name(&self) -> &'static str {
        "environment-post-processing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handles::{Environment, MapEnvironment};

    fn resolver_of(mutators: Vec<MutatorRef>) -> Arc<dyn MutatorResolver> {
        Arc::new(move |_: &BootstrapHandle, _: &Arc<DeferredLogs>| mutators.clone())
    }

    fn env_event(environment: EnvironmentRef) -> Event {
        Event::environment_prepared(BootstrapHandle::new(()), environment)
    }

    #[tokio::test]
    async fn test_mutators_run_sequentially_in_resolution_order() {
        // M2 reads the key M1 writes: sequencing is observable.
        let m1 = MutatorFn::arc("writes", |env, _| async move {
            env.set("chain.first", "from-m1".into());
            Ok(())
        });
        let m2 = MutatorFn::arc("reads", |env, _| async move {
            let seen = env.get("chain.first").ok_or(ObserverError::Fail {
                error: "m1's write not visible".into(),
            })?;
            env.set("chain.second", seen);
            Ok(())
        });

        let observer = EnvironmentPostProcessingObserver::new(resolver_of(vec![m1, m2]));
        let environment = MapEnvironment::arc();
        observer
            .on_event(&env_event(Arc::clone(&environment)))
            .await
            .unwrap();

        assert_eq!(environment.get("chain.second").as_deref(), Some("from-m1"));
    }

    #[tokio::test]
    async fn test_mutator_failure_carries_mutator_name() {
        let bad = MutatorFn::arc("broken", |_, _| async {
            Err(ObserverError::Fail {
                error: "no config file".into(),
            })
        });
        let observer = EnvironmentPostProcessingObserver::new(resolver_of(vec![bad]));

        let err = observer
            .on_event(&env_event(MapEnvironment::arc()))
            .await
            .unwrap_err();
        match err {
            ObserverError::Mutator { mutator, .. } => assert_eq!(mutator, "broken"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_switch_over_on_context_loaded_and_failed() {
        let cases: [fn(crate::handles::ContextRef) -> Event; 2] = [
            Event::context_loaded,
            |ctx| Event::failed(Some(ctx), None),
        ];
        for make_event in cases {
            let observer = EnvironmentPostProcessingObserver::new(resolver_of(vec![]));
            let logs = Arc::clone(observer.deferred_logs());
            assert!(!logs.is_switched());

            let context = crate::core::tests_support::inactive_context();
            observer.on_event(&make_event(context)).await.unwrap();
            assert!(logs.is_switched());
        }
    }

    #[tokio::test]
    async fn test_declared_phases_and_priority() {
        let observer = EnvironmentPostProcessingObserver::new(resolver_of(vec![]));
        let phases = observer.phases();
        assert!(phases.contains(Phase::EnvironmentPrepared));
        assert!(phases.contains(Phase::ContextLoaded));
        assert!(phases.contains(Phase::Failed));
        assert!(!phases.contains(Phase::Starting));
        assert!(!phases.contains(Phase::Running));
        assert_eq!(observer.priority(), ENV_POST_PROCESSING_PRIORITY);
    }

    #[tokio::test]
    async fn test_resolver_receives_bootstrap_and_logs() {
        struct Host {
            profile: &'static str,
        }

        let resolver = Arc::new(
            |bootstrap: &BootstrapHandle, logs: &Arc<DeferredLogs>| -> Vec<MutatorRef> {
                let profile = bootstrap
                    .downcast_ref::<Host>()
                    .map(|h| h.profile)
                    .unwrap_or("default");
                logs.logger("resolver").debug(format!("profile {profile}"));
                vec![MutatorFn::arc("noop", |_, _| async { Ok(()) })]
            },
        );
        let observer = EnvironmentPostProcessingObserver::new(resolver);

        let event = Event::environment_prepared(
            BootstrapHandle::new(Host { profile: "test" }),
            MapEnvironment::arc(),
        );
        observer.on_event(&event).await.unwrap();
    }
}
