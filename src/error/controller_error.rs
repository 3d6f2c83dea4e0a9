//! Controller-level error types.

use super::{ErrorCode, ErrorContext, ErrorSeverity, SchemaError, ValidationError};
use thiserror::Error;

/// A component failed while executing.
///
/// `recoverable` decides what happens to the instance: recoverable failures
/// reset it and return it to the pool, the rest discard it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Processing error: {cause}")]
pub struct ProcessingError {
    pub cause: String,
    pub recoverable: bool,
}

impl ProcessingError {
    pub fn recoverable(cause: impl Into<String>) -> Self {
        Self {
            cause: cause.into(),
            recoverable: true,
        }
    }

    /// The instance is left in an unknown state and must not be reused.
    pub fn corrupting(cause: impl Into<String>) -> Self {
        Self {
            cause: cause.into(),
            recoverable: false,
        }
    }
}

/// The controller or pool was used outside its valid state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("Controller is not initialized")]
    NotInitialized,
    #[error("Controller is already initialized")]
    AlreadyInitialized,
    #[error("Controller has been disposed")]
    Disposed,
    #[error("{count} component instance(s) still checked out")]
    InFlight { count: usize },
    #[error("Timed out draining in-flight requests, {remaining} still running")]
    DrainTimeout { remaining: usize },
}

/// Errors surfaced to callers of `init`, `process` and `dispose`.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Processing(#[from] ProcessingError),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error("Component not found for type: {0}")]
    ComponentNotFound(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Request timed out after {elapsed_ms} ms")]
    Timeout { elapsed_ms: u64 },
}

impl ControllerError {
    /// Whether retrying the same call can succeed without caller changes.
    pub fn is_recoverable(&self) -> bool {
        match self {
            ControllerError::Processing(e) => e.recoverable,
            ControllerError::Timeout { .. } => true,
            _ => false,
        }
    }

    pub fn error_context(&self) -> ErrorContext {
        let message = self.to_string();
        match self {
            ControllerError::Schema(_) => {
                ErrorContext::non_retryable(ErrorCode::SchemaError, message)
                    .with_severity(ErrorSeverity::Fatal)
            }
            ControllerError::Validation(e) => {
                ErrorContext::non_retryable(ErrorCode::ValidationError, message)
                    .with_attribute(e.attribute.clone())
            }
            ControllerError::Processing(e) if e.recoverable => {
                ErrorContext::retryable(ErrorCode::ProcessingError, message)
            }
            ControllerError::Processing(_) => {
                ErrorContext::retryable(ErrorCode::ComponentCorrupted, message)
            }
            ControllerError::Lifecycle(_) => {
                ErrorContext::non_retryable(ErrorCode::LifecycleError, message)
                    .with_severity(ErrorSeverity::Fatal)
            }
            ControllerError::ComponentNotFound(_) => {
                ErrorContext::non_retryable(ErrorCode::ComponentNotFound, message)
            }
            ControllerError::Config(_) => {
                ErrorContext::non_retryable(ErrorCode::ConfigError, message)
                    .with_severity(ErrorSeverity::Fatal)
            }
            ControllerError::Timeout { .. } => {
                ErrorContext::retryable(ErrorCode::Timeout, message)
                    .with_severity(ErrorSeverity::Warning)
            }
        }
    }
}
