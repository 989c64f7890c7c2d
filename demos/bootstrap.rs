//! Full bootstrap lifecycle: environment mutation, deferred logging,
//! background warm-up, and a minimal runtime context.
//!
//! Run with: `cargo run --example bootstrap`

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use bootvisor::{
    BackgroundInitializer, BootError, BootstrapHandle, DeferredLogs, Environment,
    EnvironmentPostProcessingObserver, Event, EventMulticaster, MapEnvironment, MutatorFn,
    MutatorRef, Observer, ObserverRef, Orchestrator, Phase, PhaseLogger, RuntimeContext,
    TracingStartup,
};

/// Minimal runtime context: an in-memory event bus behind the boundary
/// trait. Real hosts back this with their dependency container.
#[derive(Default)]
struct DemoContext {
    observers: Mutex<Vec<ObserverRef>>,
}

#[async_trait]
impl RuntimeContext for DemoContext {
    fn is_active(&self) -> bool {
        true
    }

    fn multicaster_ready(&self) -> bool {
        true
    }

    async fn publish(&self, event: &Event) -> Result<(), BootError> {
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

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), BootError> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    // Mutators run in order; the second reads what the first wrote.
    let logs = Arc::new(DeferredLogs::new());
    let resolver = Arc::new(
        |_bootstrap: &BootstrapHandle, logs: &Arc<DeferredLogs>| -> Vec<MutatorRef> {
            let log = logs.logger("mutators");
            vec![
                MutatorFn::arc("defaults", {
                    let log = log.clone();
                    move |env, _| {
                        let log = log.clone();
                        async move {
                            log.info("applying defaults (buffered until switch-over)");
                            env.set("server.port", "8080".into());
                            Ok(())
                        }
                    }
                }),
                MutatorFn::arc("banner", move |env, _| {
                    let log = log.clone();
                    async move {
                        let port = env.get("server.port").unwrap_or_default();
                        log.info(format!("will listen on port {port}"));
                        Ok(())
                    }
                }),
            ]
        },
    );

    let warmup = BackgroundInitializer::new().with_job(|| async {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        tracing::info!("cache warm-up finished");
    });

    let orchestrator = Orchestrator::builder()
        .observer(Arc::new(EnvironmentPostProcessingObserver::with_deferred_logs(
            resolver, logs,
        )))
        .observer(Arc::new(PhaseLogger))
        .observer(Arc::new(warmup))
        .startup(Arc::new(TracingStartup))
        .build();

    let bootstrap = BootstrapHandle::new("demo-host");
    let environment = MapEnvironment::arc();
    let context: Arc<DemoContext> = Arc::new(DemoContext::default());

    orchestrator
        .starting(bootstrap.clone(), Some("bootstrap::main"))
        .await?;
    orchestrator
        .environment_prepared(bootstrap, Arc::clone(&environment))
        .await?;
    orchestrator.context_prepared(context.clone()).await?;
    orchestrator.context_loaded(context.clone()).await?;
    orchestrator.started(context.clone()).await?;
    orchestrator.running(context).await?;

    tracing::info!(
        port = environment.get("server.port").as_deref(),
        "application is up"
    );
    Ok(())
}
