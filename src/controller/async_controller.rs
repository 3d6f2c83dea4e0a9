use std::sync::Arc;
use std::time::{Duration, Instant};

use super::controller::Controller;
use super::result::ProcessingResult;
use crate::attrs::AttributeSet;
use crate::error::{ControllerError, ControllerResult, ProcessingError};

/// Runs [`Controller::process`] on tokio's blocking pool.
///
/// A timeout only stops the caller from waiting. The blocking call keeps
/// running and returns its instance to the pool when it finishes.
#[derive(Debug, Clone)]
pub struct AsyncController {
    inner: Arc<Controller>,
}

impl AsyncController {
    pub fn new(controller: Arc<Controller>) -> Self {
        Self { inner: controller }
    }

    pub fn controller(&self) -> &Arc<Controller> {
        &self.inner
    }

    pub async fn process(&self, attributes: AttributeSet, component_type: &str) -> ControllerResult<ProcessingResult> {
        let controller = self.inner.clone();
        let component_type = component_type.to_string();
        tokio::task::spawn_blocking(move || controller.process(attributes, &component_type))
            .await
            .map_err(|e| ControllerError::Processing(ProcessingError::corrupting(e.to_string())))?
    }

    pub async fn process_with_timeout(
        &self,
        attributes: AttributeSet,
        component_type: &str,
        limit: Duration,
    ) -> ControllerResult<ProcessingResult> {
        let started = Instant::now();
        match tokio::time::timeout(limit, self.process(attributes, component_type)).await {
            Ok(result) => result,
            Err(_) => {
                let elapsed_ms = started.elapsed().as_millis() as u64;
                tracing::warn!(component_type, elapsed_ms, "Request timed out, still running in background");
                Err(ControllerError::Timeout { elapsed_ms })
            }
        }
    }
}

impl From<Controller> for AsyncController {
    fn from(controller: Controller) -> Self {
        Self::new(Arc::new(controller))
    }
}
