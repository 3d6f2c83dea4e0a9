use std::collections::HashMap;
use std::sync::Arc;

use super::value::AttrValue;
use xcluster_types::{Cluster, Document};

/// Attribute values currently bound on one component instance.
///
/// Components own one of these and read their inputs from it during
/// `execute`, writing outputs back before returning.
#[derive(Debug, Clone, Default)]
pub struct AttrStore {
    values: HashMap<String, AttrValue>,
}

impl AttrStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of `name`, [`AttrValue::None`] when unset.
    pub fn get(&self, name: &str) -> &AttrValue {
        static NONE: AttrValue = AttrValue::None;
        self.values.get(name).unwrap_or(&NONE)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).as_str()
    }

    pub fn i64(&self, name: &str) -> Option<i64> {
        self.get(name).as_i64()
    }

    pub fn f64(&self, name: &str) -> Option<f64> {
        self.get(name).as_f64()
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        self.get(name).as_bool()
    }

    pub fn string_array(&self, name: &str) -> &[String] {
        self.get(name).as_string_array().unwrap_or(&[])
    }

    pub fn documents(&self, name: &str) -> &[Arc<Document>] {
        self.get(name).as_documents().unwrap_or(&[])
    }

    pub fn set_clusters(&mut self, name: impl Into<String>, clusters: Vec<Cluster>) {
        self.set(name, AttrValue::clusters(clusters));
    }
}

/// Anything exposing an [`AttrStore`] the binder can write into.
pub trait Bindable {
    fn attrs(&self) -> &AttrStore;
    fn attrs_mut(&mut self) -> &mut AttrStore;
}

impl Bindable for AttrStore {
    fn attrs(&self) -> &AttrStore {
        self
    }

    fn attrs_mut(&mut self) -> &mut AttrStore {
        self
    }
}
