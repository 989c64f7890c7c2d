//! # bootvisor
//!
//! **Bootvisor** is a bootstrap lifecycle orchestration library for Rust.
//!
//! It drives a host process through a fixed sequence of startup phases,
//! broadcasting a typed event at each phase to a priority-ordered set of
//! observers, with strict ordering, failure isolation, and safe deferred
//! logging for the window before the logging backend exists. The crate is
//! designed as a building block for application frameworks and service
//! hosts.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!       host bootstrap (one call per phase, in order)
//!            │
//!            ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  Orchestrator                                                   │
//! │  - Startup (instrumentation step around every broadcast)        │
//! │  - EventMulticaster (initial registry, sorted dispatch)         │
//! └──────┬────────────────────────────────┬─────────────────────────┘
//!        │ Starting..ContextLoaded        │ Started / Running / Failed*
//!        ▼                                ▼
//! ┌──────────────────────┐        ┌──────────────────────┐
//! │  EventMulticaster    │        │  RuntimeContext bus  │
//! │  (priority, reg.     │        │  (observers attached │
//! │   order; sequential) │        │   at ContextLoaded)  │
//! └──────┬───────────────┘        └──────────────────────┘
//!        │                          *Failed falls back to the initial
//!        ▼                           multicaster when the context bus
//!   Observers                        is not wired yet
//!    ├── EnvironmentPostProcessingObserver ──► mutators, in order
//!    │         └── DeferredLogs.switch_over() on ContextLoaded/Failed
//!    ├── BackgroundInitializer ──► spawn at EnvironmentPrepared,
//!    │                             join at Running/Failed
//!    └── host observers
//! ```
//!
//! ### Lifecycle
//! ```text
//! Starting → EnvironmentPrepared → ContextPrepared → ContextLoaded
//!          → Started → Running                         (happy path)
//!
//! Failed   (from any state, terminal, per-observer containment)
//! ```
//!
//! ## Guarantees
//! - **Ordering**: observers run in non-decreasing priority order; ties
//!   keep registration order. Sequential, never concurrent.
//! - **Fail-fast**: an observer error during a non-terminal phase aborts
//!   that dispatch and surfaces to the caller.
//! - **Containment**: during `Failed`, one observer's error or panic never
//!   prevents the remaining observers from running; contained failures are
//!   logged, never discarded.
//! - **Deferred logging**: lines recorded before the backend exists are
//!   buffered and replayed exactly once, in per-logger emission order,
//!   whether bootstrap succeeds or fails.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use bootvisor::{
//!     BootstrapHandle, DeferredLogs, Environment, EnvironmentPostProcessingObserver,
//!     MapEnvironment, MutatorFn, MutatorRef, Orchestrator, PhaseLogger,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), bootvisor::BootError> {
//!     let env_observer = EnvironmentPostProcessingObserver::new(Arc::new(
//!         |_bootstrap: &BootstrapHandle, _logs: &Arc<DeferredLogs>| -> Vec<MutatorRef> {
//!             vec![MutatorFn::arc("defaults", |env, _| async move {
//!                 env.set("server.port", "8080".into());
//!                 Ok(())
//!             })]
//!         },
//!     ));
//!
//!     let orchestrator = Orchestrator::builder()
//!         .observer(Arc::new(env_observer))
//!         .observer(Arc::new(PhaseLogger))
//!         .build();
//!
//!     let bootstrap = BootstrapHandle::new(());
//!     let environment = MapEnvironment::arc();
//!
//!     orchestrator.starting(bootstrap.clone(), Some("demo::Main")).await?;
//!     orchestrator
//!         .environment_prepared(bootstrap, Arc::clone(&environment))
//!         .await?;
//!     assert_eq!(environment.get("server.port").as_deref(), Some("8080"));
//!     Ok(())
//! }
//! ```

mod core;
mod error;
mod events;
mod handles;
mod logging;
mod observers;
mod startup;

// ---- Public re-exports ----

pub use crate::core::{Orchestrator, OrchestratorBuilder};
pub use error::{BootError, ObserverError};
pub use events::{BootFailure, Event, EventMulticaster, Phase, PhaseSet};
pub use handles::{
    BootstrapHandle, ContextRef, Environment, EnvironmentRef, MapEnvironment, RuntimeContext,
};
pub use logging::{DeferredLogger, DeferredLogs, LogLevel, LogSink, TracingSink};
pub use observers::{
    BackgroundInitializer, EnvironmentMutator, EnvironmentPostProcessingObserver, MutatorFn,
    MutatorRef, MutatorResolver, Observer, ObserverRef, PhaseLogger,
    ENV_POST_PROCESSING_PRIORITY, HIGHEST_PRIORITY, LOWEST_PRIORITY,
};
pub use startup::{NoopStartup, Startup, StartupRef, StartupStep, TracingStartup};
