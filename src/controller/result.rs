use serde::{Serialize, Serializer};
use serde_json::Value;
use std::sync::Arc;

use crate::attrs::{names, AttrValue, AttributeSet};
use xcluster_types::{Cluster, Document};

/// Immutable output of one `process` call.
///
/// Holds the request attributes merged with the component's outputs. It does
/// not reference the instance that produced it.
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    attributes: AttributeSet,
    clusters: Arc<Vec<Cluster>>,
}

impl ProcessingResult {
    pub fn new(attributes: AttributeSet) -> Self {
        let clusters = match attributes.get(names::CLUSTERS) {
            Some(AttrValue::Clusters(clusters)) => clusters.clone(),
            _ => Arc::new(Vec::new()),
        };
        Self {
            attributes,
            clusters,
        }
    }

    /// Top-level clusters; empty when the component produced none.
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    /// Documents the request was run on.
    pub fn documents(&self) -> &[Arc<Document>] {
        self.attributes.get_documents(names::DOCUMENTS).unwrap_or(&[])
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    /// Time spent in `process`, in milliseconds.
    pub fn processing_time_ms(&self) -> Option<i64> {
        self.attributes.get_i64(names::PROCESSING_TIME_TOTAL)
    }

    pub fn into_attributes(self) -> AttributeSet {
        self.attributes
    }

    pub fn to_json(&self) -> Value {
        self.attributes.to_json()
    }
}

impl Serialize for ProcessingResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.attributes.serialize(serializer)
    }
}
