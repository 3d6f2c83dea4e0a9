//! Leaf data model shared by the controller and clustering components.
//!
//! - [`Document`]: an immutable set of named text fields.
//! - [`Cluster`]: a labelled group of documents with nested subclusters.

pub mod cluster;
pub mod document;

pub use cluster::{all_documents, clusters_equivalent, collect_labels, Cluster, OTHER_TOPICS_LABEL};
pub use document::Document;
