use std::collections::HashMap;
use std::sync::Arc;

use super::traits::ComponentFactory;

/// Registry of component factories by component type id
#[derive(Clone, Default)]
pub struct ComponentRegistry {
    factories: HashMap<String, Arc<dyn ComponentFactory>>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under its own type id, replacing any previous one.
    pub fn register(&mut self, factory: Arc<dyn ComponentFactory>) {
        let component_type = factory.component_type().to_string();
        if self.factories.insert(component_type.clone(), factory).is_some() {
            tracing::warn!(component_type = %component_type, "Replacing registered component factory");
        }
    }

    pub fn get(&self, component_type: &str) -> Option<&Arc<dyn ComponentFactory>> {
        self.factories.get(component_type)
    }

    pub fn contains(&self, component_type: &str) -> bool {
        self.factories.contains_key(component_type)
    }

    /// Registered type ids, sorted.
    pub fn component_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("component_types", &self.component_types())
            .finish()
    }
}
