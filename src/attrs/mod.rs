//! Typed attribute schema and binding.
//!
//! Components declare their configurable inputs and produced outputs as a
//! list of [`AttrDescriptor`]s collected in an [`AttrSchema`]. The
//! [`binder`] functions move values between caller-facing [`AttributeSet`]s
//! and the [`AttrStore`] held by each component instance.

pub mod binder;
pub mod coercion;
pub mod constraint;
pub mod descriptor;
pub mod names;
pub mod schema;
pub mod set;
pub mod store;
pub mod value;

pub use constraint::Constraint;
pub use descriptor::{AttrDescriptor, AttrDescriptorBuilder, BindPhase, Direction, StringArrayBuilder};
pub use schema::AttrSchema;
pub use set::AttributeSet;
pub use store::{AttrStore, Bindable};
pub use value::{AttrKind, AttrValue};
