//! Reference observer that logs every phase through `tracing`.

use async_trait::async_trait;

use crate::error::ObserverError;
use crate::events::{Event, Phase};

use super::observer::Observer;

/// Base observer that logs phase transitions.
///
/// Useful for demos and debugging; production hosts usually wire their own
/// observability observers.
pub struct PhaseLogger;

#[async_trait]
impl Observer for PhaseLogger {
    async fn on_event(&self, event: &Event) -> Result<(), ObserverError> {
        match event.phase {
            Phase::Starting => {
                tracing::info!(main_class = event.main_class.as_deref(), "starting");
            }
            Phase::Failed => {
                let error = event.error.as_ref().map(|e| e.to_string());
                tracing::error!(error = error.as_deref(), "bootstrap failed");
            }
            phase => {
                tracing::info!("{phase}");
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "phase-logger"
    }
}
