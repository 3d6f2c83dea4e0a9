use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use xcluster_types::{Cluster, Document};

// ================================
// AttrValue – typed attribute values
// ================================

#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    None,
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    StringArray(Vec<String>),
    Documents(Arc<Vec<Arc<Document>>>),
    Clusters(Arc<Vec<Cluster>>),
}

/// Declared type of an attribute slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttrKind {
    String,
    Integer,
    Float,
    Boolean,
    StringArray,
    Documents,
    Clusters,
}

impl fmt::Display for AttrKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttrKind::String => "string",
            AttrKind::Integer => "integer",
            AttrKind::Float => "float",
            AttrKind::Boolean => "boolean",
            AttrKind::StringArray => "array[string]",
            AttrKind::Documents => "documents",
            AttrKind::Clusters => "clusters",
        };
        f.write_str(name)
    }
}

impl AttrValue {
    /// Kind of the value, `None` for [`AttrValue::None`].
    pub fn kind(&self) -> Option<AttrKind> {
        match self {
            AttrValue::None => None,
            AttrValue::String(_) => Some(AttrKind::String),
            AttrValue::Integer(_) => Some(AttrKind::Integer),
            AttrValue::Float(_) => Some(AttrKind::Float),
            AttrValue::Boolean(_) => Some(AttrKind::Boolean),
            AttrValue::StringArray(_) => Some(AttrKind::StringArray),
            AttrValue::Documents(_) => Some(AttrKind::Documents),
            AttrValue::Clusters(_) => Some(AttrKind::Clusters),
        }
    }

    pub fn documents(docs: Vec<Document>) -> Self {
        AttrValue::Documents(Arc::new(docs.into_iter().map(Arc::new).collect()))
    }

    pub fn clusters(clusters: Vec<Cluster>) -> Self {
        AttrValue::Clusters(Arc::new(clusters))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, AttrValue::None)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttrValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Integer(i) => Some(*i as f64),
            AttrValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_string_array(&self) -> Option<&[String]> {
        match self {
            AttrValue::StringArray(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_documents(&self) -> Option<&[Arc<Document>]> {
        match self {
            AttrValue::Documents(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn as_clusters(&self) -> Option<&[Cluster]> {
        match self {
            AttrValue::Clusters(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// Empty string, empty sequence or `None`.
    pub fn is_empty(&self) -> bool {
        match self {
            AttrValue::None => true,
            AttrValue::String(s) => s.is_empty(),
            AttrValue::StringArray(v) => v.is_empty(),
            AttrValue::Documents(v) => v.is_empty(),
            AttrValue::Clusters(v) => v.is_empty(),
            _ => false,
        }
    }

    /// Convert AttrValue → serde_json::Value
    pub fn to_json(&self) -> Value {
        match self {
            AttrValue::None => Value::Null,
            AttrValue::String(s) => Value::String(s.clone()),
            AttrValue::Integer(i) => serde_json::json!(*i),
            AttrValue::Float(f) => serde_json::json!(*f),
            AttrValue::Boolean(b) => Value::Bool(*b),
            AttrValue::StringArray(v) => {
                Value::Array(v.iter().map(|s| Value::String(s.clone())).collect())
            }
            AttrValue::Documents(docs) => serde_json::to_value(docs.as_ref()).unwrap_or(Value::Null),
            AttrValue::Clusters(clusters) => {
                serde_json::to_value(clusters.as_ref()).unwrap_or(Value::Null)
            }
        }
    }

    /// Create an AttrValue from serde_json::Value.
    ///
    /// Arrays of strings become [`AttrValue::StringArray`], arrays of objects
    /// are read as documents. Mixed arrays, objects and documents with
    /// non-string fields are rejected.
    pub fn from_json(v: &Value) -> Result<Self, String> {
        match v {
            Value::Null => Ok(AttrValue::None),
            Value::Bool(b) => Ok(AttrValue::Boolean(*b)),
            Value::Number(n) => Ok(match n.as_i64() {
                Some(i) => AttrValue::Integer(i),
                None => AttrValue::Float(n.as_f64().unwrap_or(0.0)),
            }),
            Value::String(s) => Ok(AttrValue::String(s.clone())),
            Value::Array(arr) if arr.iter().all(Value::is_string) => Ok(AttrValue::StringArray(
                arr.iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
            )),
            Value::Array(arr) if arr.iter().all(Value::is_object) => {
                serde_json::from_value::<Vec<Document>>(v.clone())
                    .map(AttrValue::documents)
                    .map_err(|e| format!("invalid documents: {}", e))
            }
            Value::Array(_) => Err("array must hold only strings or only document objects".to_string()),
            Value::Object(_) => Err("unsupported JSON object".to_string()),
        }
    }
}

impl Serialize for AttrValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AttrValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let v = Value::deserialize(deserializer)?;
        AttrValue::from_json(&v).map_err(serde::de::Error::custom)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::String(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::String(v)
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Integer(v)
    }
}

impl From<i32> for AttrValue {
    fn from(v: i32) -> Self {
        AttrValue::Integer(v as i64)
    }
}

impl From<usize> for AttrValue {
    fn from(v: usize) -> Self {
        AttrValue::Integer(v as i64)
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Float(v)
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Boolean(v)
    }
}

impl From<Vec<String>> for AttrValue {
    fn from(v: Vec<String>) -> Self {
        AttrValue::StringArray(v)
    }
}

impl From<Vec<&str>> for AttrValue {
    fn from(v: Vec<&str>) -> Self {
        AttrValue::StringArray(v.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<Document>> for AttrValue {
    fn from(v: Vec<Document>) -> Self {
        AttrValue::documents(v)
    }
}

impl From<Vec<Arc<Document>>> for AttrValue {
    fn from(v: Vec<Arc<Document>>) -> Self {
        AttrValue::Documents(Arc::new(v))
    }
}

impl From<Vec<Cluster>> for AttrValue {
    fn from(v: Vec<Cluster>) -> Self {
        AttrValue::clusters(v)
    }
}

impl<T: Into<AttrValue>> From<Option<T>> for AttrValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(AttrValue::None)
    }
}
