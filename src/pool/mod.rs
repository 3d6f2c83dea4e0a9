//! Component instance pooling.

pub mod component_pool;
pub mod stats;

pub use component_pool::{ComponentPool, PoolPolicy, PooledInstance, SlotId};
pub use stats::PoolStats;
