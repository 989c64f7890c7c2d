//! # Phase observers for the bootstrap sequence.
//!
//! This module provides the [`Observer`] trait and the built-in
//! implementations the orchestrator ships with.
//!
//! ## Architecture
//! ```text
//! Phase call (orchestrator)
//!     │
//!     ▼
//! EventMulticaster ── sorted by (priority, registration order)
//!     │
//!     ├──► EnvironmentPostProcessingObserver  (HIGHEST_PRIORITY + 10)
//!     │        runs mutators / trips log switch-over
//!     ├──► host observers                     (priority 0 by default)
//!     └──► BackgroundInitializer              (LOWEST_PRIORITY)
//!              spawns + later joins warm-up jobs
//! ```
//!
//! ## Implementing custom observers
//! ```rust
//! use async_trait::async_trait;
//! use bootvisor::{Event, Observer, ObserverError, Phase, PhaseSet};
//!
//! struct ReadinessFlag;
//!
//! #[async_trait]
//! impl Observer for ReadinessFlag {
//!     async fn on_event(&self, event: &Event) -> Result<(), ObserverError> {
//!         // flip the readiness gauge...
//!         let _ = event;
//!         Ok(())
//!     }
//!
//!     fn phases(&self) -> PhaseSet {
//!         PhaseSet::of(&[Phase::Running, Phase::Failed])
//!     }
//! }
//! ```

mod background;
mod env;
mod log;
mod observer;

pub use background::BackgroundInitializer;
pub use env::{
    EnvironmentMutator, EnvironmentPostProcessingObserver, MutatorFn, MutatorRef, MutatorResolver,
    ENV_POST_PROCESSING_PRIORITY,
};
pub use log::PhaseLogger;
pub use observer::{Observer, ObserverRef, HIGHEST_PRIORITY, LOWEST_PRIORITY};
