//! Error types for the controller.
//!
//! - [`SchemaError`]: descriptor or schema construction failures (fatal at registration).
//! - [`ValidationError`]: a bound attribute value was rejected.
//! - [`ProcessingError`]: a component failed while executing.
//! - [`LifecycleError`]: the controller or pool was used in the wrong state.
//! - [`ControllerError`]: everything surfaced by `init`/`process`/`dispose`.
//! - [`ErrorContext`]: structured error metadata (code, retryability, severity).

pub mod attr_error;
pub mod controller_error;
pub mod error_context;

pub use attr_error::{SchemaError, ValidationError};
pub use controller_error::{ControllerError, LifecycleError, ProcessingError};
pub use error_context::{ErrorCode, ErrorContext, ErrorRetryability, ErrorSeverity};

/// Convenience alias for controller-level results.
pub type ControllerResult<T> = Result<T, ControllerError>;
/// Convenience alias for schema construction results.
pub type SchemaResult<T> = Result<T, SchemaError>;
