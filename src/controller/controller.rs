//! The processing controller: lifecycle state machine over a component pool.

use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

use super::config::{ControllerConfig, Strategy};
use super::result::ProcessingResult;
use crate::attrs::{binder, names, AttrStore, AttrValue, AttributeSet, BindPhase};
use crate::component::{ComponentFactory, ComponentRegistry};
use crate::error::{ControllerResult, LifecycleError, ProcessingError, SchemaError, SchemaResult};
use crate::pool::{ComponentPool, PoolStats};

/// Where a controller is in its lifecycle. `Disposed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Uninitialized,
    Initialized,
    Disposed,
}

struct Lifecycle {
    state: ControllerState,
    pool: Option<Arc<ComponentPool>>,
    in_flight: HashMap<String, usize>,
    in_flight_total: usize,
}

/// Runs processing requests against registered component types.
///
/// One controller is shared by reference across threads; `process` blocks the
/// calling thread until the component finishes.
///
/// ```no_run
/// use xcluster::{AttributeSet, Controller, ComponentRegistry};
///
/// # fn run(registry: ComponentRegistry) -> xcluster::error::ControllerResult<()> {
/// let controller = Controller::pooling(registry);
/// controller.init(AttributeSet::new())?;
/// let result = controller.process(AttributeSet::new().with("query", "rust"), "term-clustering")?;
/// println!("{} clusters", result.clusters().len());
/// controller.dispose()?;
/// # Ok(())
/// # }
/// ```
pub struct Controller {
    registry: Arc<ComponentRegistry>,
    config: ControllerConfig,
    lifecycle: Mutex<Lifecycle>,
    drained: Condvar,
}

impl Controller {
    pub fn new(registry: impl Into<Arc<ComponentRegistry>>, config: ControllerConfig) -> Self {
        Self {
            registry: registry.into(),
            config,
            lifecycle: Mutex::new(Lifecycle {
                state: ControllerState::Uninitialized,
                pool: None,
                in_flight: HashMap::new(),
                in_flight_total: 0,
            }),
            drained: Condvar::new(),
        }
    }

    pub fn builder() -> ControllerBuilder {
        ControllerBuilder::new()
    }

    /// Fresh instance per request.
    pub fn simple(registry: impl Into<Arc<ComponentRegistry>>) -> Self {
        Self::new(registry, ControllerConfig::default())
    }

    /// Instances reused across requests, idle list unbounded.
    pub fn pooling(registry: impl Into<Arc<ComponentRegistry>>) -> Self {
        Self::new(
            registry,
            ControllerConfig {
                strategy: Strategy::Pooling,
                ..ControllerConfig::default()
            },
        )
    }

    pub fn state(&self) -> ControllerState {
        self.lifecycle.lock().state
    }

    pub fn strategy(&self) -> Strategy {
        self.config.strategy
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Record the init attributes and open the pool.
    ///
    /// `attributes` override the configured `init_attributes`. The merged set is
    /// validated against every registered component's init-phase descriptors,
    /// so a bad value fails here instead of on the first request.
    pub fn init(&self, attributes: AttributeSet) -> ControllerResult<()> {
        let mut lifecycle = self.lifecycle.lock();
        match lifecycle.state {
            ControllerState::Uninitialized => {}
            ControllerState::Initialized => return Err(LifecycleError::AlreadyInitialized.into()),
            ControllerState::Disposed => return Err(LifecycleError::Disposed.into()),
        }

        let mut init_attributes = self.config.init_attribute_set()?;
        init_attributes.merge(&attributes);
        for component_type in self.registry.component_types() {
            if let Some(factory) = self.registry.get(component_type) {
                validate_init(factory.as_ref(), &init_attributes)?;
            }
        }

        lifecycle.pool = Some(Arc::new(ComponentPool::new(
            self.registry.clone(),
            init_attributes,
            self.config.pool_policy(),
        )));
        lifecycle.state = ControllerState::Initialized;
        tracing::info!(
            strategy = ?self.config.strategy,
            component_types = self.registry.len(),
            "Controller initialized"
        );
        Ok(())
    }

    /// Run one request on an instance of `component_type`.
    ///
    /// The returned result holds `attributes` merged with the component's
    /// outputs and `processing.time.total`.
    pub fn process(&self, attributes: AttributeSet, component_type: &str) -> ControllerResult<ProcessingResult> {
        let started = Instant::now();
        let request_id = Uuid::new_v4();
        let span = tracing::debug_span!("process", component_type, request_id = %request_id);
        let _entered = span.enter();

        let (pool, _in_flight) = self.enter(component_type)?;
        let outputs = run(&pool, &attributes, component_type)?;

        let mut merged = attributes;
        merged.merge(&outputs);
        let elapsed_ms = started.elapsed().as_millis() as i64;
        merged.insert(names::PROCESSING_TIME_TOTAL, elapsed_ms);
        tracing::debug!(elapsed_ms, "Request processed");
        Ok(ProcessingResult::new(merged))
    }

    /// Stop accepting requests, wait for in-flight ones, then dispose every
    /// pooled instance.
    ///
    /// With a drain timeout configured, returns [`LifecycleError::DrainTimeout`]
    /// once it expires; the controller stays disposed and the remaining
    /// instances are disposed as their requests finish.
    pub fn dispose(&self) -> ControllerResult<()> {
        let (pool, remaining) = {
            let mut lifecycle = self.lifecycle.lock();
            match lifecycle.state {
                ControllerState::Initialized => {}
                ControllerState::Uninitialized => return Err(LifecycleError::NotInitialized.into()),
                ControllerState::Disposed => return Err(LifecycleError::Disposed.into()),
            }
            lifecycle.state = ControllerState::Disposed;
            if lifecycle.in_flight_total > 0 {
                tracing::info!(in_flight = lifecycle.in_flight_total, "Draining in-flight requests");
            }

            let deadline = self.config.drain_timeout().map(|t| Instant::now() + t);
            while lifecycle.in_flight_total > 0 {
                match deadline {
                    Some(deadline) => {
                        if self.drained.wait_until(&mut lifecycle, deadline).timed_out() {
                            break;
                        }
                    }
                    None => self.drained.wait(&mut lifecycle),
                }
            }
            (lifecycle.pool.take(), lifecycle.in_flight_total)
        };

        let Some(pool) = pool else {
            return Ok(());
        };
        if remaining > 0 {
            pool.shutdown();
            tracing::warn!(remaining, "Drain timed out, controller disposed with requests in flight");
            return Err(LifecycleError::DrainTimeout { remaining }.into());
        }
        let disposed = pool.dispose_all()?;
        tracing::info!(disposed, "Controller disposed");
        Ok(())
    }

    /// `process` calls currently running for `component_type`.
    pub fn in_flight(&self, component_type: &str) -> usize {
        self.lifecycle
            .lock()
            .in_flight
            .get(component_type)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_in_flight(&self) -> usize {
        self.lifecycle.lock().in_flight_total
    }

    /// Pool counters for `component_type`; zeroed before `init` and after `dispose`.
    pub fn pool_stats(&self, component_type: &str) -> PoolStats {
        let pool = self.lifecycle.lock().pool.clone();
        pool.map(|p| p.stats(component_type)).unwrap_or_default()
    }

    fn enter(&self, component_type: &str) -> ControllerResult<(Arc<ComponentPool>, InFlightGuard<'_>)> {
        let mut lifecycle = self.lifecycle.lock();
        match lifecycle.state {
            ControllerState::Initialized => {}
            ControllerState::Uninitialized => return Err(LifecycleError::NotInitialized.into()),
            ControllerState::Disposed => return Err(LifecycleError::Disposed.into()),
        }
        let pool = lifecycle
            .pool
            .clone()
            .ok_or(LifecycleError::NotInitialized)?;
        *lifecycle.in_flight.entry(component_type.to_string()).or_insert(0) += 1;
        lifecycle.in_flight_total += 1;
        Ok((
            pool,
            InFlightGuard {
                controller: self,
                component_type: component_type.to_string(),
            },
        ))
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("state", &self.state())
            .field("strategy", &self.config.strategy)
            .field("registry", &self.registry)
            .finish()
    }
}

/// Decrements the in-flight counters when a `process` call ends, however it ends.
struct InFlightGuard<'c> {
    controller: &'c Controller,
    component_type: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut lifecycle = self.controller.lifecycle.lock();
        if let Some(count) = lifecycle.in_flight.get_mut(&self.component_type) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                lifecycle.in_flight.remove(&self.component_type);
            }
        }
        lifecycle.in_flight_total = lifecycle.in_flight_total.saturating_sub(1);
        if lifecycle.in_flight_total == 0 {
            self.controller.drained.notify_all();
        }
    }
}

fn validate_init(factory: &dyn ComponentFactory, attributes: &AttributeSet) -> ControllerResult<()> {
    let mut scratch = AttrStore::new();
    binder::bind(&mut scratch, factory.schema(), attributes, BindPhase::Init)?;
    Ok(())
}

fn run(pool: &ComponentPool, attributes: &AttributeSet, component_type: &str) -> ControllerResult<AttributeSet> {
    let mut lease = pool.checkout(component_type)?;
    let slot = lease.slot();

    let bound = {
        let (schema, instance) = lease.parts_mut();
        binder::bind(instance, schema, attributes, BindPhase::Request)
    };
    if let Err(e) = bound {
        tracing::debug!(slot, attribute = %e.attribute, reason = %e.reason, "Request attributes rejected");
        pool.checkin(lease);
        return Err(e.into());
    }

    let executed = catch_unwind(AssertUnwindSafe(|| lease.component_mut().execute()))
        .unwrap_or_else(|payload| Err(ProcessingError::corrupting(panic_message(payload.as_ref()))));

    match executed {
        Ok(()) => {
            let outputs = {
                let (schema, instance) = lease.parts_mut();
                let outputs = binder::harvest(&*instance, schema);
                binder::reset(instance, schema);
                outputs
            };
            pool.checkin(lease);
            Ok(outputs)
        }
        Err(e) if e.recoverable => {
            tracing::warn!(slot, cause = %e.cause, "Component failed, instance reset");
            let (schema, instance) = lease.parts_mut();
            binder::reset(instance, schema);
            pool.checkin(lease);
            Err(e.into())
        }
        Err(e) => {
            tracing::error!(slot, cause = %e.cause, "Component failed, instance discarded");
            pool.discard(lease);
            Err(e.into())
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("component panicked: {}", detail)
}

/// Builds a [`Controller`] in code.
#[derive(Default)]
pub struct ControllerBuilder {
    registry: ComponentRegistry,
    config: ControllerConfig,
    error: Option<SchemaError>,
}

impl ControllerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the registry collected so far.
    pub fn registry(mut self, registry: ComponentRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn register(mut self, factory: Arc<dyn ComponentFactory>) -> Self {
        self.registry.register(factory);
        self
    }

    /// Run a registration function against the registry.
    ///
    /// The first schema error is kept and returned by [`build`](Self::build).
    pub fn components<F>(mut self, register: F) -> Self
    where
        F: FnOnce(&mut ComponentRegistry) -> SchemaResult<()>,
    {
        if self.error.is_none() {
            if let Err(e) = register(&mut self.registry) {
                tracing::warn!(error = %e, "Component registration failed");
                self.error = Some(e);
            }
        }
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: ControllerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    pub fn max_idle_per_type(mut self, max_idle: usize) -> Self {
        self.config.max_idle_per_type = max_idle;
        self
    }

    pub fn drain_timeout(mut self, timeout: Duration) -> Self {
        self.config.drain_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    pub fn init_attribute(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.config
            .init_attributes
            .insert(name.into(), value.into().to_json());
        self
    }

    pub fn build(self) -> ControllerResult<Controller> {
        if let Some(e) = self.error {
            return Err(e.into());
        }
        Ok(Controller::new(self.registry, self.config))
    }
}
