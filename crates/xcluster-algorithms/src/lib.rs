//! Reference clustering components for the xcluster controller.

use std::sync::Arc;

use xcluster::component::ComponentRegistry;
use xcluster::error::SchemaResult;

pub mod term_clustering;

pub use term_clustering::{TermClusteringComponent, TermClusteringFactory};

/// Register every built-in component type on `registry`.
pub fn register_builtin(registry: &mut ComponentRegistry) -> SchemaResult<()> {
    registry.register(Arc::new(TermClusteringFactory::new()?));
    Ok(())
}

/// A registry holding the built-in component types.
pub fn create_registry() -> SchemaResult<ComponentRegistry> {
    let mut registry = ComponentRegistry::new();
    register_builtin(&mut registry)?;
    Ok(registry)
}
