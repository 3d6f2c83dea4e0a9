use thiserror::Error;

/// Errors raised while building attribute descriptors or schemas.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Default value of attribute '{attribute}' rejected: {reason}")]
    DefaultRejected { attribute: String, reason: String },
    #[error("Duplicate attribute in schema: {0}")]
    DuplicateAttribute(String),
    #[error("Invalid attribute name: {0:?}")]
    InvalidName(String),
}

/// A value bound onto a component was rejected by its descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid value for attribute '{attribute}': {reason}")]
pub struct ValidationError {
    pub attribute: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(attribute: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            reason: reason.into(),
        }
    }
}
