//! Well-known attribute names shared by the controller and components.

/// Input documents.
pub const DOCUMENTS: &str = "documents";
/// Output cluster tree.
pub const CLUSTERS: &str = "clusters";
/// Query that produced the documents, if any.
pub const QUERY: &str = "query";
/// Language of the documents.
pub const LANGUAGE: &str = "language";
/// Component type id requested by the caller.
pub const ALGORITHM: &str = "algorithm";
/// Wall-clock time spent in `process`, in milliseconds.
pub const PROCESSING_TIME_TOTAL: &str = "processing.time.total";
