//! Exclusive-checkout pool of component instances.
//!
//! Idle instances live in a per-type free list behind one mutex. A checkout
//! moves the boxed instance out of the list into a [`PooledInstance`] lease;
//! dropping the lease moves it back. An instance is therefore owned either by
//! the pool or by exactly one caller, never both.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use super::stats::PoolStats;
use crate::attrs::{binder, AttrSchema, AttributeSet, BindPhase};
use crate::component::{ComponentFactory, ComponentRegistry, ProcessingComponent};
use crate::error::{ControllerError, ControllerResult, LifecycleError};

/// Identifier of one instance for its whole lifetime.
pub type SlotId = u64;

/// How instances are kept between checkouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolPolicy {
    /// Keep returned instances for later checkouts.
    pub reuse: bool,
    /// Upper bound on idle instances per type, 0 for unbounded.
    pub max_idle_per_type: usize,
}

impl PoolPolicy {
    pub fn pooling(max_idle_per_type: usize) -> Self {
        Self {
            reuse: true,
            max_idle_per_type,
        }
    }

    /// Every checkout builds a fresh instance; every release disposes it.
    pub fn unpooled() -> Self {
        Self {
            reuse: false,
            max_idle_per_type: 0,
        }
    }
}

struct IdleSlot {
    slot: SlotId,
    instance: Box<dyn ProcessingComponent>,
}

#[derive(Default)]
struct TypeSlots {
    idle: Vec<IdleSlot>,
    stats: PoolStats,
}

#[derive(Default)]
struct PoolState {
    types: HashMap<String, TypeSlots>,
    next_slot: SlotId,
    closed: bool,
}

impl PoolState {
    fn checked_out(&self) -> usize {
        self.types.values().map(|s| s.stats.checked_out).sum()
    }

    /// Mark the pool closed and take every idle instance out of it.
    fn close(&mut self) -> Vec<IdleSlot> {
        self.closed = true;
        self.types
            .values_mut()
            .flat_map(|slots| {
                slots.stats.disposed += slots.idle.len() as u64;
                std::mem::take(&mut slots.idle)
            })
            .collect()
    }
}

fn dispose_idle(drained: Vec<IdleSlot>) -> usize {
    let count = drained.len();
    for mut idle in drained {
        idle.instance.dispose();
    }
    tracing::info!(disposed = count, "Component pool shut down");
    count
}

/// Pool of component instances keyed by component type.
pub struct ComponentPool {
    registry: Arc<ComponentRegistry>,
    init_attributes: AttributeSet,
    policy: PoolPolicy,
    state: Mutex<PoolState>,
}

enum Reserved {
    Idle(IdleSlot),
    New(SlotId),
}

impl ComponentPool {
    pub fn new(registry: Arc<ComponentRegistry>, init_attributes: AttributeSet, policy: PoolPolicy) -> Self {
        Self {
            registry,
            init_attributes,
            policy,
            state: Mutex::new(PoolState::default()),
        }
    }

    pub fn policy(&self) -> PoolPolicy {
        self.policy
    }

    pub fn init_attributes(&self) -> &AttributeSet {
        &self.init_attributes
    }

    /// Take an idle instance of `component_type`, or build a new one.
    ///
    /// New instances get the pool's init attributes bound and their
    /// [`init`](ProcessingComponent::init) hook run before being handed out.
    pub fn checkout(&self, component_type: &str) -> ControllerResult<PooledInstance<'_>> {
        let factory = self
            .registry
            .get(component_type)
            .cloned()
            .ok_or_else(|| ControllerError::ComponentNotFound(component_type.to_string()))?;

        let reserved = {
            let mut state = self.state.lock();
            let PoolState {
                types,
                next_slot,
                closed,
            } = &mut *state;
            if *closed {
                return Err(LifecycleError::Disposed.into());
            }
            let slots = types.entry(component_type.to_string()).or_default();
            slots.stats.record_checkout();
            match slots.idle.pop() {
                Some(idle) => Reserved::Idle(idle),
                None => {
                    *next_slot += 1;
                    Reserved::New(*next_slot)
                }
            }
        };

        let (slot, instance) = match reserved {
            Reserved::Idle(idle) => (idle.slot, idle.instance),
            Reserved::New(slot) => match self.create_instance(factory.as_ref()) {
                Ok(instance) => {
                    self.with_stats(component_type, |stats| stats.created += 1);
                    tracing::debug!(component_type, slot, "Created component instance");
                    (slot, instance)
                }
                Err(e) => {
                    self.with_stats(component_type, PoolStats::record_release);
                    tracing::warn!(component_type, error = %e, "Failed to create component instance");
                    return Err(e);
                }
            },
        };

        Ok(PooledInstance {
            pool: self,
            component_type: component_type.to_string(),
            slot,
            factory,
            instance: Some(instance),
            discard: false,
        })
    }

    /// Return a leased instance so later checkouts can reuse it.
    ///
    /// Dropping the lease does the same; this only makes the hand-back explicit.
    pub fn checkin(&self, lease: PooledInstance<'_>) {
        debug_assert!(std::ptr::eq(lease.pool, self), "lease returned to a foreign pool");
        drop(lease);
    }

    /// Drop a leased instance instead of returning it.
    ///
    /// Used after a corrupting failure; the next checkout builds a fresh one.
    pub fn discard(&self, mut lease: PooledInstance<'_>) {
        debug_assert!(std::ptr::eq(lease.pool, self), "lease discarded in a foreign pool");
        lease.discard = true;
        drop(lease);
    }

    /// Dispose every idle instance and close the pool.
    ///
    /// Requires that no instance is checked out; otherwise nothing is touched
    /// and [`LifecycleError::InFlight`] is returned.
    pub fn dispose_all(&self) -> Result<usize, LifecycleError> {
        let drained = {
            let mut state = self.state.lock();
            let in_flight = state.checked_out();
            if in_flight > 0 {
                return Err(LifecycleError::InFlight { count: in_flight });
            }
            state.close()
        };
        Ok(dispose_idle(drained))
    }

    /// Close the pool and dispose the idle instances, ignoring checkouts.
    ///
    /// Instances still leased are disposed when their lease is released.
    /// Returns the number of instances disposed now.
    pub fn shutdown(&self) -> usize {
        let drained = self.state.lock().close();
        dispose_idle(drained)
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn stats(&self, component_type: &str) -> PoolStats {
        let state = self.state.lock();
        state
            .types
            .get(component_type)
            .map(|slots| PoolStats {
                idle: slots.idle.len(),
                ..slots.stats
            })
            .unwrap_or_default()
    }

    pub fn total_checked_out(&self) -> usize {
        self.state.lock().checked_out()
    }

    fn create_instance(
        &self,
        factory: &dyn ComponentFactory,
    ) -> ControllerResult<Box<dyn ProcessingComponent>> {
        let schema: &AttrSchema = factory.schema();
        let mut instance = factory.create()?;
        let prepared = binder::bind(instance.as_mut(), schema, &self.init_attributes, BindPhase::Init)
            .map_err(ControllerError::from)
            .and_then(|()| {
                binder::reset(instance.as_mut(), schema);
                instance.init().map_err(ControllerError::from)
            });
        if let Err(e) = prepared {
            instance.dispose();
            return Err(e);
        }
        Ok(instance)
    }

    fn with_stats(&self, component_type: &str, f: impl FnOnce(&mut PoolStats)) {
        let mut state = self.state.lock();
        f(&mut state.types.entry(component_type.to_string()).or_default().stats);
    }

    fn release(&self, component_type: &str, slot: SlotId, instance: Box<dyn ProcessingComponent>, discard: bool) {
        let to_dispose = {
            let mut state = self.state.lock();
            let closed = state.closed;
            let slots = state.types.entry(component_type.to_string()).or_default();
            slots.stats.record_release();
            let keep = !discard
                && !closed
                && self.policy.reuse
                && (self.policy.max_idle_per_type == 0 || slots.idle.len() < self.policy.max_idle_per_type);
            if keep {
                slots.idle.push(IdleSlot { slot, instance });
                None
            } else {
                if discard {
                    slots.stats.discarded += 1;
                } else {
                    slots.stats.disposed += 1;
                }
                Some(instance)
            }
        };

        if let Some(mut instance) = to_dispose {
            if discard {
                tracing::warn!(component_type, slot, "Discarding corrupted component instance");
            } else {
                tracing::trace!(component_type, slot, "Disposing released component instance");
            }
            instance.dispose();
        }
    }
}

impl std::fmt::Debug for ComponentPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentPool")
            .field("policy", &self.policy)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Exclusive lease on one pooled instance.
///
/// Released on drop: returned to the pool normally, discarded when the lease
/// was marked for discard or the thread is unwinding from a panic.
pub struct PooledInstance<'p> {
    pool: &'p ComponentPool,
    component_type: String,
    slot: SlotId,
    factory: Arc<dyn ComponentFactory>,
    instance: Option<Box<dyn ProcessingComponent>>,
    discard: bool,
}

impl std::fmt::Debug for PooledInstance<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledInstance")
            .field("component_type", &self.component_type)
            .field("slot", &self.slot)
            .field("discard", &self.discard)
            .finish()
    }
}

impl PooledInstance<'_> {
    pub fn slot(&self) -> SlotId {
        self.slot
    }

    pub fn component_type(&self) -> &str {
        &self.component_type
    }

    pub fn schema(&self) -> &AttrSchema {
        self.factory.schema()
    }

    pub fn component(&self) -> &dyn ProcessingComponent {
        self.instance
            .as_deref()
            .expect("pooled instance present until the lease is dropped")
    }

    pub fn component_mut(&mut self) -> &mut dyn ProcessingComponent {
        self.instance
            .as_deref_mut()
            .expect("pooled instance present until the lease is dropped")
    }

    /// Schema and instance borrowed together, for binding.
    pub fn parts_mut(&mut self) -> (&AttrSchema, &mut dyn ProcessingComponent) {
        let schema = self.factory.schema().as_ref();
        let instance = self
            .instance
            .as_deref_mut()
            .expect("pooled instance present until the lease is dropped");
        (schema, instance)
    }
}

impl Drop for PooledInstance<'_> {
    fn drop(&mut self) {
        if let Some(instance) = self.instance.take() {
            let discard = self.discard || std::thread::panicking();
            self.pool
                .release(&self.component_type, self.slot, instance, discard);
        }
    }
}
