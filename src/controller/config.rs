use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use std::time::Duration;

use crate::attrs::AttributeSet;
use crate::error::{ControllerError, ControllerResult};
use crate::pool::PoolPolicy;

/// How the controller obtains component instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// A fresh instance per request, disposed right after.
    #[default]
    Simple,
    /// Instances are reused across requests through the pool.
    Pooling,
}

/// Controller configuration.
///
/// ```toml
/// strategy = "pooling"
/// max_idle_per_type = 8
/// drain_timeout_ms = 5000
///
/// [init_attributes]
/// fields = ["title", "snippet"]
/// min_term_length = 3
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub strategy: Strategy,
    /// Idle instances kept per component type, 0 for unbounded.
    pub max_idle_per_type: usize,
    /// How long `dispose` waits for in-flight requests; `None` waits forever.
    pub drain_timeout_ms: Option<u64>,
    /// Init-phase attributes applied to every created instance.
    pub init_attributes: Map<String, Value>,
}

impl ControllerConfig {
    pub fn from_toml_str(s: &str) -> ControllerResult<Self> {
        toml::from_str(s).map_err(|e| ControllerError::Config(e.to_string()))
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> ControllerResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ControllerError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    pub fn drain_timeout(&self) -> Option<Duration> {
        self.drain_timeout_ms.map(Duration::from_millis)
    }

    /// Init attributes as typed values; a value that does not convert is a
    /// validation error naming the attribute.
    pub fn init_attribute_set(&self) -> ControllerResult<AttributeSet> {
        Ok(AttributeSet::from_json_map(&self.init_attributes)?)
    }

    pub fn pool_policy(&self) -> PoolPolicy {
        match self.strategy {
            Strategy::Simple => PoolPolicy::unpooled(),
            Strategy::Pooling => PoolPolicy::pooling(self.max_idle_per_type),
        }
    }
}
