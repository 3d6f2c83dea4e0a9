//! Component capability traits and the factory registry.

pub mod registry;
pub mod traits;

pub use registry::ComponentRegistry;
pub use traits::{ComponentFactory, FnComponentFactory, ProcessingComponent};
