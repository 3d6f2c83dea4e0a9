//! # xcluster: pooled controller for pluggable clustering components
//!
//! `xcluster` hosts stateful document-clustering components behind a
//! thread-safe [`Controller`]. Components declare their attributes once as a
//! typed [`AttrSchema`]; the controller binds caller-supplied values onto an
//! instance, runs it, and harvests the outputs into a [`ProcessingResult`].
//!
//! - **Attributes**: typed descriptors with phases (init / request), directions
//!   (input / output), constraints and defaults; binding is all-or-nothing.
//! - **Pooling**: instances are checked out exclusively and returned on every
//!   exit path; corrupted instances are discarded.
//! - **Lifecycle**: `init` → `process`* → `dispose`, with a blocking drain of
//!   in-flight requests on dispose.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use xcluster::attrs::{AttrDescriptor, AttrSchema, AttrStore, Bindable};
//! use xcluster::component::{FnComponentFactory, ProcessingComponent};
//! use xcluster::error::ProcessingError;
//! use xcluster::{AttributeSet, ComponentRegistry, Controller};
//!
//! struct Count(AttrStore);
//!
//! impl Bindable for Count {
//!     fn attrs(&self) -> &AttrStore { &self.0 }
//!     fn attrs_mut(&mut self) -> &mut AttrStore { &mut self.0 }
//! }
//!
//! impl ProcessingComponent for Count {
//!     fn execute(&mut self) -> Result<(), ProcessingError> {
//!         let n = self.0.documents("documents").len();
//!         self.0.set("count", n);
//!         Ok(())
//!     }
//! }
//!
//! let schema = AttrSchema::new(vec![
//!     AttrDescriptor::documents("documents").default_value(Vec::<xcluster::Document>::new()).unwrap(),
//!     AttrDescriptor::integer("count").output().no_default().unwrap(),
//! ]).unwrap();
//! let mut registry = ComponentRegistry::new();
//! registry.register(Arc::new(FnComponentFactory::new("count", schema, || {
//!     Ok(Box::new(Count(AttrStore::new())) as Box<dyn ProcessingComponent>)
//! })));
//!
//! let controller = Controller::pooling(registry);
//! controller.init(AttributeSet::new()).unwrap();
//! let result = controller.process(AttributeSet::new(), "count").unwrap();
//! assert_eq!(result.attributes().get_i64("count"), Some(0));
//! controller.dispose().unwrap();
//! ```

pub mod attrs;
pub mod component;
pub mod controller;
pub mod error;
pub mod pool;

pub use attrs::{AttrDescriptor, AttrKind, AttrSchema, AttrValue, AttributeSet, BindPhase, Constraint, Direction};
pub use component::{ComponentFactory, ComponentRegistry, FnComponentFactory, ProcessingComponent};
pub use controller::{
    AsyncController, Controller, ControllerBuilder, ControllerConfig, ControllerState, ProcessingResult, Strategy,
};
pub use error::{ControllerError, ControllerResult};
pub use pool::{ComponentPool, PoolPolicy, PoolStats};
pub use xcluster_types::{Cluster, Document};
