use std::sync::Arc;

use crate::attrs::{AttrSchema, Bindable};
use crate::error::ProcessingError;

/// A pluggable, stateful processing unit hosted by the controller.
///
/// The controller binds inputs into the instance's [`AttrStore`](crate::attrs::AttrStore)
/// before calling [`execute`](Self::execute) and reads outputs from it
/// afterwards. Pooled instances are reused, so `execute` must depend only on
/// the bound attributes and on state built in [`init`](Self::init).
pub trait ProcessingComponent: Bindable + Send {
    /// Called once after the init-phase attributes are bound.
    fn init(&mut self) -> Result<(), ProcessingError> {
        Ok(())
    }

    /// Process the currently bound inputs and store the outputs.
    fn execute(&mut self) -> Result<(), ProcessingError>;

    /// Release resources; the instance is dropped right after.
    fn dispose(&mut self) {}
}

/// Creates instances of one component type and owns its schema.
pub trait ComponentFactory: Send + Sync {
    fn component_type(&self) -> &str;

    fn schema(&self) -> &Arc<AttrSchema>;

    fn create(&self) -> Result<Box<dyn ProcessingComponent>, ProcessingError>;
}

type CreateFn = dyn Fn() -> Result<Box<dyn ProcessingComponent>, ProcessingError> + Send + Sync;

/// [`ComponentFactory`] backed by a closure.
pub struct FnComponentFactory {
    component_type: String,
    schema: Arc<AttrSchema>,
    create: Box<CreateFn>,
}

impl FnComponentFactory {
    pub fn new<F>(component_type: impl Into<String>, schema: AttrSchema, create: F) -> Self
    where
        F: Fn() -> Result<Box<dyn ProcessingComponent>, ProcessingError> + Send + Sync + 'static,
    {
        Self {
            component_type: component_type.into(),
            schema: Arc::new(schema),
            create: Box::new(create),
        }
    }
}

impl ComponentFactory for FnComponentFactory {
    fn component_type(&self) -> &str {
        &self.component_type
    }

    fn schema(&self) -> &Arc<AttrSchema> {
        &self.schema
    }

    fn create(&self) -> Result<Box<dyn ProcessingComponent>, ProcessingError> {
        (self.create)()
    }
}
