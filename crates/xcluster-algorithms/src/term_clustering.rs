//! Frequent-term clustering.
//!
//! Each document is reduced to the set of terms found in its configured
//! fields. Clusters are formed greedily: the term shared by the most
//! still-unassigned documents becomes the next cluster, until no term is
//! shared by at least two documents or `max_clusters` is reached. Large
//! clusters are refined once more into subclusters the same way. Whatever
//! is left, including documents with no usable terms, lands in
//! "Other Topics".
//!
//! Every choice is ordered by count and then lexicographically, so the same
//! input always yields the same clusters.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

use xcluster::attrs::{names, AttrDescriptor, AttrSchema, AttrStore, Bindable, Constraint};
use xcluster::component::{ComponentFactory, ProcessingComponent};
use xcluster::error::{ProcessingError, SchemaResult};
use xcluster_types::{Cluster, Document};

pub const COMPONENT_TYPE: &str = "term-clustering";

pub const FIELDS: &str = "fields";
pub const MIN_TERM_LENGTH: &str = "min_term_length";
pub const MAX_CLUSTERS: &str = "max_clusters";

const MIN_CLUSTER_SIZE: usize = 2;
const SUBCLUSTER_THRESHOLD: usize = 6;
const MAX_SUBCLUSTERS: usize = 3;

const STOPWORDS: &[&str] = &[
    "about", "above", "after", "again", "against", "all", "also", "and", "any", "are", "because",
    "been", "before", "being", "below", "between", "both", "but", "can", "could", "did", "does",
    "doing", "down", "during", "each", "few", "for", "from", "further", "had", "has", "have",
    "having", "her", "here", "hers", "him", "his", "how", "into", "its", "itself", "just", "more",
    "most", "not", "now", "off", "once", "only", "other", "our", "ours", "out", "over", "own",
    "same", "she", "should", "some", "such", "than", "that", "the", "their", "theirs", "them",
    "then", "there", "these", "they", "this", "those", "through", "too", "under", "until", "very",
    "was", "were", "what", "when", "where", "which", "while", "who", "whom", "why", "will", "with",
    "would", "you", "your", "yours",
];

pub fn schema() -> SchemaResult<AttrSchema> {
    AttrSchema::new(vec![
        AttrDescriptor::string_array(FIELDS)
            .label("Fields to extract terms from")
            .init()
            .constraint(Constraint::non_empty())
            .default_values("title", ["snippet"])?,
        AttrDescriptor::integer(MIN_TERM_LENGTH)
            .label("Minimum term length")
            .init()
            .constraint(Constraint::int_range(1, 32))
            .default_value(3)?,
        AttrDescriptor::documents(names::DOCUMENTS)
            .label("Documents")
            .default_value(Vec::<Document>::new())?,
        AttrDescriptor::integer(MAX_CLUSTERS)
            .label("Maximum number of clusters")
            .constraint(Constraint::int_range(1, 1000))
            .default_value(20)?,
        AttrDescriptor::string(names::QUERY)
            .label("Query that produced the documents")
            .no_default()?,
        AttrDescriptor::clusters(names::CLUSTERS)
            .label("Clusters")
            .output()
            .no_default()?,
    ])
}

pub struct TermClusteringComponent {
    attrs: AttrStore,
    fields: Vec<String>,
    min_term_length: usize,
    stopwords: HashSet<&'static str>,
}

impl TermClusteringComponent {
    pub fn new() -> Self {
        Self {
            attrs: AttrStore::new(),
            fields: Vec::new(),
            min_term_length: 1,
            stopwords: HashSet::new(),
        }
    }

    fn terms(&self, document: &Document, excluded: &BTreeSet<String>) -> BTreeSet<String> {
        self.fields
            .iter()
            .filter_map(|field| document.field(field))
            .flat_map(tokenize)
            .filter(|t| t.chars().count() >= self.min_term_length)
            .filter(|t| !t.chars().all(|c| c.is_ascii_digit()))
            .filter(|t| !self.stopwords.contains(t.as_str()))
            .filter(|t| !excluded.contains(t))
            .collect()
    }
}

impl Default for TermClusteringComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl Bindable for TermClusteringComponent {
    fn attrs(&self) -> &AttrStore {
        &self.attrs
    }

    fn attrs_mut(&mut self) -> &mut AttrStore {
        &mut self.attrs
    }
}

impl ProcessingComponent for TermClusteringComponent {
    fn init(&mut self) -> Result<(), ProcessingError> {
        self.fields = self.attrs.string_array(FIELDS).to_vec();
        let min_term_length = self.attrs.i64(MIN_TERM_LENGTH).unwrap_or(3);
        self.min_term_length = usize::try_from(min_term_length)
            .map_err(|_| ProcessingError::corrupting(format!("invalid {}: {}", MIN_TERM_LENGTH, min_term_length)))?;
        self.stopwords = STOPWORDS.iter().copied().collect();
        tracing::debug!(fields = ?self.fields, min_term_length, "Term clustering initialized");
        Ok(())
    }

    fn execute(&mut self) -> Result<(), ProcessingError> {
        let documents: Vec<Arc<Document>> = self.attrs.documents(names::DOCUMENTS).to_vec();
        let max_clusters = self.attrs.i64(MAX_CLUSTERS).unwrap_or(20).max(1) as usize;
        let query_terms: BTreeSet<String> = self
            .attrs
            .str(names::QUERY)
            .map(|q| tokenize(q).collect())
            .unwrap_or_default();

        let terms: Vec<BTreeSet<String>> = documents
            .iter()
            .map(|d| self.terms(d, &query_terms))
            .collect();
        let members: Vec<usize> = (0..documents.len()).collect();

        let groups = partition(&terms, &members, max_clusters, None);
        let mut assigned = vec![false; documents.len()];
        let mut clusters = Vec::with_capacity(groups.len() + 1);
        for (term, group) in &groups {
            for &i in group {
                assigned[i] = true;
            }
            let mut cluster = Cluster::new(to_label(term))
                .with_documents(group.iter().map(|&i| documents[i].clone()).collect())
                .with_score(group.len() as f64 / documents.len() as f64);
            if group.len() >= SUBCLUSTER_THRESHOLD {
                let subclusters: Vec<Cluster> = partition(&terms, group, MAX_SUBCLUSTERS, Some(term.as_str()))
                    .into_iter()
                    .filter(|(_, sub)| sub.len() < group.len())
                    .map(|(sub_term, sub)| {
                        Cluster::new(format!("{} {}", to_label(term), sub_term))
                            .with_documents(sub.iter().map(|&i| documents[i].clone()).collect())
                            .with_score(sub.len() as f64 / group.len() as f64)
                    })
                    .collect();
                cluster = cluster.with_subclusters(subclusters);
            }
            clusters.push(cluster);
        }

        let unassigned: Vec<Arc<Document>> = documents
            .iter()
            .zip(&assigned)
            .filter(|(_, taken)| !**taken)
            .map(|(d, _)| d.clone())
            .collect();
        if !unassigned.is_empty() {
            clusters.push(Cluster::other_topics(unassigned));
        }

        tracing::debug!(
            documents = documents.len(),
            clusters = clusters.len(),
            "Term clustering finished"
        );
        self.attrs.set_clusters(names::CLUSTERS, clusters);
        Ok(())
    }

    fn dispose(&mut self) {
        self.stopwords.clear();
        self.fields.clear();
    }
}

/// Greedy disjoint grouping of `members` by shared term.
///
/// Returns `(term, member indices)` pairs in selection order. `skip` is left
/// out of the candidate terms.
fn partition(
    terms: &[BTreeSet<String>],
    members: &[usize],
    limit: usize,
    skip: Option<&str>,
) -> Vec<(String, Vec<usize>)> {
    let mut remaining: Vec<usize> = members.to_vec();
    let mut groups = Vec::new();
    while groups.len() < limit {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for &i in &remaining {
            for term in &terms[i] {
                if Some(term.as_str()) != skip {
                    *counts.entry(term.as_str()).or_insert(0) += 1;
                }
            }
        }
        // BTreeMap iterates in term order, so the first maximum is the smallest term.
        let best = counts
            .into_iter()
            .fold(None::<(&str, usize)>, |best, (term, count)| match best {
                Some((_, c)) if c >= count => best,
                _ => Some((term, count)),
            });
        let Some((term, count)) = best else { break };
        if count < MIN_CLUSTER_SIZE {
            break;
        }
        let term = term.to_string();
        let (group, rest): (Vec<usize>, Vec<usize>) =
            remaining.into_iter().partition(|&i| terms[i].contains(&term));
        remaining = rest;
        groups.push((term, group));
    }
    groups
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

fn to_label(term: &str) -> String {
    let mut chars = term.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Factory registered under [`COMPONENT_TYPE`].
pub struct TermClusteringFactory {
    schema: Arc<AttrSchema>,
}

impl TermClusteringFactory {
    pub fn new() -> SchemaResult<Self> {
        Ok(Self {
            schema: Arc::new(schema()?),
        })
    }
}

impl ComponentFactory for TermClusteringFactory {
    fn component_type(&self) -> &str {
        COMPONENT_TYPE
    }

    fn schema(&self) -> &Arc<AttrSchema> {
        &self.schema
    }

    fn create(&self) -> Result<Box<dyn ProcessingComponent>, ProcessingError> {
        Ok(Box::new(TermClusteringComponent::new()))
    }
}
