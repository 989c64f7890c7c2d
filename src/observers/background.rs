//! # Background initializer.
//!
//! Some startup work (validator warm-up, cache priming, driver class
//! loading) does not need to block the main phase sequence. The
//! [`BackgroundInitializer`] observer spawns its registered jobs on the
//! runtime when the environment is prepared and joins them before the
//! application reports ready — or on failure, so a failed bootstrap never
//! leaves detached initialization running unobserved.
//!
//! ## Phase reactions
//! - `EnvironmentPrepared`: spawn every registered job, exactly once.
//! - `Running` / `Failed`: await every spawned job to completion. A job
//!   panic is logged and does not fail the phase.
//!
//! Runs at [`LOWEST_PRIORITY`]: warm-up must not delay observers that
//! other observers depend on.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use futures::future::BoxFuture;
use tokio::task::JoinHandle;

use crate::error::ObserverError;
use crate::events::{Event, Phase, PhaseSet};

use super::observer::{Observer, LOWEST_PRIORITY};

type Job = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

const PHASES: PhaseSet = PhaseSet::of(&[Phase::EnvironmentPrepared, Phase::Running, Phase::Failed]);

/// Observer that runs registered init jobs in the background and joins
/// them before `Running` completes.
#[derive(Default)]
pub struct BackgroundInitializer {
    jobs: Mutex<Vec<Job>>,
    handles: Mutex<Vec<JoinHandle<()>>>,
    spawned: AtomicBool,
}

impl BackgroundInitializer {
    /// Creates an initializer with no jobs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one init job (builder style).
    pub fn with_job<F, Fut>(self, job: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        self.lock_jobs().push(Box::new(move || Box::pin(job())));
        self
    }

    fn lock_jobs(&self) -> std::sync::MutexGuard<'_, Vec<Job>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_handles(&self) -> std::sync::MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.handles.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn spawn_all(&self) {
        if self
            .spawned
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }
        let jobs = std::mem::take(&mut *self.lock_jobs());
        let mut handles = self.lock_handles();
        for job in jobs {
            handles.push(tokio::spawn(job()));
        }
    }

    async fn join_all(&self) {
        let handles = std::mem::take(&mut *self.lock_handles());
        for handle in handles {
            if let Err(join) = handle.await {
                tracing::warn!(error = %join, "background init job did not finish cleanly");
            }
        }
    }
}

#[async_trait]
impl Observer for BackgroundInitializer {
    async fn on_event(&self, event: &Event) -> Result<(), ObserverError> {
        match event.phase {
            Phase::EnvironmentPrepared => self.spawn_all(),
            Phase::Running | Phase::Failed => self.join_all().await,
            _ => {}
        }
        Ok(())
    }

    fn phases(&self) -> PhaseSet {
        PHASES
    }

    fn priority(&self) -> i32 {
        LOWEST_PRIORITY
    }

    fn name(&self) -> &'static str {
        "background-initializer"
    }
}
