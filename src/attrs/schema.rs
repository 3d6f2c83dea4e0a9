use std::collections::HashMap;

use super::descriptor::{AttrDescriptor, BindPhase};
use crate::error::SchemaError;

/// The declared attribute list of one component type.
///
/// Built once at registration; descriptor names are unique and the
/// declaration order is kept for iteration.
#[derive(Debug, Clone, Default)]
pub struct AttrSchema {
    descriptors: Vec<AttrDescriptor>,
    index: HashMap<String, usize>,
}

impl AttrSchema {
    pub fn new(descriptors: Vec<AttrDescriptor>) -> Result<Self, SchemaError> {
        let mut index = HashMap::with_capacity(descriptors.len());
        for (i, d) in descriptors.iter().enumerate() {
            if index.insert(d.name().to_string(), i).is_some() {
                return Err(SchemaError::DuplicateAttribute(d.name().to_string()));
            }
        }
        Ok(Self { descriptors, index })
    }

    pub fn get(&self, name: &str) -> Option<&AttrDescriptor> {
        self.index.get(name).map(|&i| &self.descriptors[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttrDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Input descriptors bound in `phase`.
    pub fn inputs(&self, phase: BindPhase) -> impl Iterator<Item = &AttrDescriptor> {
        self.descriptors
            .iter()
            .filter(move |d| d.phase() == phase && d.direction().is_input())
    }

    /// Descriptors reported back by `harvest`.
    pub fn outputs(&self) -> impl Iterator<Item = &AttrDescriptor> {
        self.descriptors.iter().filter(|d| d.direction().is_output())
    }

    /// Descriptors restored to their defaults after every request.
    pub fn request_scoped(&self) -> impl Iterator<Item = &AttrDescriptor> {
        self.descriptors
            .iter()
            .filter(|d| d.phase() == BindPhase::Request)
    }
}
