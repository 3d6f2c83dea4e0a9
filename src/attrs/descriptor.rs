use serde::{Deserialize, Serialize};

use super::coercion::coerce;
use super::constraint::Constraint;
use super::value::{AttrKind, AttrValue};
use crate::error::{SchemaError, ValidationError};

/// When an attribute is bound onto an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindPhase {
    /// Once, when the instance is created. Persists for the instance's lifetime.
    Init,
    /// Before every execution; reset to the default afterwards.
    Request,
}

/// Whether an attribute is read by the component, produced by it, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Input,
    Output,
    InOut,
}

impl Direction {
    pub fn is_input(self) -> bool {
        matches!(self, Direction::Input | Direction::InOut)
    }

    pub fn is_output(self) -> bool {
        matches!(self, Direction::Output | Direction::InOut)
    }
}

/// Immutable schema entry for one attribute slot of a component.
#[derive(Debug, Clone)]
pub struct AttrDescriptor {
    name: String,
    label: String,
    kind: AttrKind,
    default: AttrValue,
    constraint: Constraint,
    phase: BindPhase,
    direction: Direction,
    required: bool,
}

impl AttrDescriptor {
    pub fn builder(name: impl Into<String>, kind: AttrKind) -> AttrDescriptorBuilder {
        AttrDescriptorBuilder::new(name.into(), kind)
    }

    pub fn string(name: impl Into<String>) -> AttrDescriptorBuilder {
        Self::builder(name, AttrKind::String)
    }

    pub fn integer(name: impl Into<String>) -> AttrDescriptorBuilder {
        Self::builder(name, AttrKind::Integer)
    }

    pub fn float(name: impl Into<String>) -> AttrDescriptorBuilder {
        Self::builder(name, AttrKind::Float)
    }

    pub fn boolean(name: impl Into<String>) -> AttrDescriptorBuilder {
        Self::builder(name, AttrKind::Boolean)
    }

    pub fn string_array(name: impl Into<String>) -> StringArrayBuilder {
        StringArrayBuilder {
            inner: Self::builder(name, AttrKind::StringArray),
        }
    }

    pub fn documents(name: impl Into<String>) -> AttrDescriptorBuilder {
        Self::builder(name, AttrKind::Documents)
    }

    pub fn clusters(name: impl Into<String>) -> AttrDescriptorBuilder {
        Self::builder(name, AttrKind::Clusters)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> AttrKind {
        self.kind
    }

    pub fn default_value(&self) -> &AttrValue {
        &self.default
    }

    pub fn constraint(&self) -> &Constraint {
        &self.constraint
    }

    pub fn phase(&self) -> BindPhase {
        self.phase
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Coerce and check a candidate value, returning the value to store.
    pub fn validate(&self, value: AttrValue) -> Result<AttrValue, ValidationError> {
        self.check(value)
            .map_err(|reason| ValidationError::new(self.name.clone(), reason))
    }

    fn check(&self, value: AttrValue) -> Result<AttrValue, String> {
        let value = coerce(value, self.kind)?;
        if value.is_none() {
            return if self.required {
                Err("required attribute has no value".to_string())
            } else {
                Ok(value)
            };
        }
        self.constraint.check(&value)?;
        Ok(value)
    }
}

/// Builder for [`AttrDescriptor`]; finalized by [`default_value`](Self::default_value).
#[derive(Debug)]
pub struct AttrDescriptorBuilder {
    name: String,
    label: Option<String>,
    kind: AttrKind,
    constraint: Constraint,
    phase: BindPhase,
    direction: Direction,
    required: bool,
}

impl AttrDescriptorBuilder {
    fn new(name: String, kind: AttrKind) -> Self {
        Self {
            name,
            label: None,
            kind,
            constraint: Constraint::any(),
            phase: BindPhase::Request,
            direction: Direction::Input,
            required: false,
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraint = constraint;
        self
    }

    pub fn phase(mut self, phase: BindPhase) -> Self {
        self.phase = phase;
        self
    }

    /// Shorthand for `phase(BindPhase::Init)`.
    pub fn init(self) -> Self {
        self.phase(BindPhase::Init)
    }

    /// Produced by the component, not read from the caller.
    pub fn output(mut self) -> Self {
        self.direction = Direction::Output;
        self
    }

    /// Read from the caller and reported back in the result.
    pub fn in_out(mut self) -> Self {
        self.direction = Direction::InOut;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Finalize the descriptor with a default value.
    ///
    /// The default goes through the same coercion and constraint as any bound
    /// value; a rejected default fails construction.
    pub fn default_value(self, value: impl Into<AttrValue>) -> Result<AttrDescriptor, SchemaError> {
        self.build(value.into())
    }

    /// Finalize the descriptor without a default (`None`).
    pub fn no_default(self) -> Result<AttrDescriptor, SchemaError> {
        self.build(AttrValue::None)
    }

    fn build(self, default: AttrValue) -> Result<AttrDescriptor, SchemaError> {
        if self.name.trim().is_empty() || self.name.chars().any(char::is_whitespace) {
            return Err(SchemaError::InvalidName(self.name));
        }
        let mut descriptor = AttrDescriptor {
            label: self.label.unwrap_or_else(|| self.name.clone()),
            name: self.name,
            kind: self.kind,
            default: AttrValue::None,
            constraint: self.constraint,
            phase: self.phase,
            direction: self.direction,
            // Outputs start out empty before the first execution.
            required: self.required && self.direction != Direction::Output,
        };
        // A required input with no default is satisfied by the caller, not the schema.
        let check_default = !(default.is_none() && descriptor.required);
        if check_default {
            descriptor.default = descriptor.check(default).map_err(|reason| {
                SchemaError::DefaultRejected {
                    attribute: descriptor.name.clone(),
                    reason,
                }
            })?;
        }
        Ok(descriptor)
    }
}

/// Builder for sequence-of-strings attributes.
///
/// Accepts the default either as one sequence or as a first value followed by
/// the rest; both normalize to a single ordered sequence.
#[derive(Debug)]
pub struct StringArrayBuilder {
    inner: AttrDescriptorBuilder,
}

impl StringArrayBuilder {
    pub fn label(self, label: impl Into<String>) -> Self {
        Self {
            inner: self.inner.label(label),
        }
    }

    pub fn constraint(self, constraint: Constraint) -> Self {
        Self {
            inner: self.inner.constraint(constraint),
        }
    }

    pub fn phase(self, phase: BindPhase) -> Self {
        Self {
            inner: self.inner.phase(phase),
        }
    }

    pub fn init(self) -> Self {
        self.phase(BindPhase::Init)
    }

    pub fn in_out(self) -> Self {
        Self {
            inner: self.inner.in_out(),
        }
    }

    pub fn required(self) -> Self {
        Self {
            inner: self.inner.required(),
        }
    }

    pub fn default_value<I, S>(self, values: I) -> Result<AttrDescriptor, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        self.inner.build(AttrValue::StringArray(values))
    }

    pub fn default_values<I, S>(self, first: impl Into<String>, rest: I) -> Result<AttrDescriptor, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = std::iter::once(first.into()).chain(rest.into_iter().map(Into::into));
        self.default_value(values)
    }
}
