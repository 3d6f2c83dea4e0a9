//! Request processing: lifecycle, configuration and results.

pub mod async_controller;
pub mod config;
#[allow(clippy::module_inception)]
pub mod controller;
pub mod result;

pub use async_controller::AsyncController;
pub use config::{ControllerConfig, Strategy};
pub use controller::{Controller, ControllerBuilder, ControllerState};
pub use result::ProcessingResult;
