use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

use crate::document::Document;

/// Label of the group collecting documents no other cluster claimed.
pub const OTHER_TOPICS_LABEL: &str = "Other Topics";

/// A labelled group of documents, possibly with nested subclusters.
///
/// Clusters are assembled with the consuming `with_*` methods and are not
/// mutated afterwards. Member documents are shared immutable handles; the
/// tree itself is owned by whoever holds the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    label: String,
    #[serde(default)]
    documents: Vec<Arc<Document>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    subclusters: Vec<Cluster>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    score: Option<f64>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    other_topics: bool,
}

impl Cluster {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            documents: Vec::new(),
            subclusters: Vec::new(),
            score: None,
            other_topics: false,
        }
    }

    /// The "Other Topics" cluster for documents left unassigned.
    pub fn other_topics(documents: Vec<Arc<Document>>) -> Self {
        Self {
            other_topics: true,
            ..Self::new(OTHER_TOPICS_LABEL).with_documents(documents)
        }
    }

    pub fn with_documents(mut self, documents: Vec<Arc<Document>>) -> Self {
        self.documents = documents;
        self
    }

    pub fn with_subclusters(mut self, subclusters: Vec<Cluster>) -> Self {
        self.subclusters = subclusters;
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Documents assigned directly to this cluster.
    pub fn documents(&self) -> &[Arc<Document>] {
        &self.documents
    }

    pub fn subclusters(&self) -> &[Cluster] {
        &self.subclusters
    }

    pub fn score(&self) -> Option<f64> {
        self.score
    }

    pub fn is_other_topics(&self) -> bool {
        self.other_topics
    }

    /// Number of distinct documents in this cluster and all its subclusters.
    pub fn size(&self) -> usize {
        self.all_documents().len()
    }

    /// Distinct documents of the whole subtree, in first-seen order.
    pub fn all_documents(&self) -> Vec<Arc<Document>> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        self.collect_documents(&mut seen, &mut out);
        out
    }

    fn collect_documents(&self, seen: &mut HashSet<*const Document>, out: &mut Vec<Arc<Document>>) {
        for doc in &self.documents {
            if seen.insert(Arc::as_ptr(doc)) {
                out.push(doc.clone());
            }
        }
        for sub in &self.subclusters {
            sub.collect_documents(seen, out);
        }
    }
}

/// Distinct documents across a cluster list, in first-seen order.
pub fn all_documents(clusters: &[Cluster]) -> Vec<Arc<Document>> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for cluster in clusters {
        cluster.collect_documents(&mut seen, &mut out);
    }
    out
}

/// Labels of every cluster in the tree, depth first.
pub fn collect_labels(clusters: &[Cluster]) -> Vec<String> {
    let mut labels = Vec::new();
    let mut stack: Vec<&Cluster> = clusters.iter().rev().collect();
    while let Some(cluster) = stack.pop() {
        labels.push(cluster.label.clone());
        stack.extend(cluster.subclusters.iter().rev());
    }
    labels
}

/// Order-insensitive structural comparison of two cluster lists.
///
/// Two lists are equivalent when they contain the same multiset of clusters,
/// where clusters match on label, member documents (compared by content) and,
/// recursively, subclusters. Scores are ignored.
pub fn clusters_equivalent(a: &[Cluster], b: &[Cluster]) -> bool {
    a.len() == b.len() && shape_of(a) == shape_of(b)
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct ClusterShape<'a> {
    label: &'a str,
    other_topics: bool,
    documents: Vec<&'a Document>,
    subclusters: Vec<ClusterShape<'a>>,
}

fn shape_of(clusters: &[Cluster]) -> Vec<ClusterShape<'_>> {
    let mut shapes: Vec<ClusterShape<'_>> = clusters
        .iter()
        .map(|c| {
            let mut documents: Vec<&Document> = c.documents.iter().map(Arc::as_ref).collect();
            documents.sort();
            ClusterShape {
                label: &c.label,
                other_topics: c.other_topics,
                documents,
                subclusters: shape_of(&c.subclusters),
            }
        })
        .collect();
    shapes.sort();
    shapes
}
