#![allow(dead_code)]

use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

use xcluster::attrs::{AttrDescriptor, AttrSchema, AttrStore, Bindable, Constraint};
use xcluster::component::{ComponentRegistry, FnComponentFactory, ProcessingComponent};
use xcluster::error::ProcessingError;
use xcluster::{AttributeSet, Controller, ControllerConfig, Strategy};

pub const PROBE: &str = "probe";
pub const BROKEN: &str = "broken";

/// Blocks `gate`-mode executions until opened.
#[derive(Default)]
pub struct Gate {
    open: Mutex<bool>,
    opened: Condvar,
    waiting: AtomicUsize,
}

impl Gate {
    pub fn pass(&self) {
        self.waiting.fetch_add(1, Ordering::SeqCst);
        let mut open = self.open.lock();
        while !*open {
            self.opened.wait(&mut open);
        }
        drop(open);
        self.waiting.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn open(&self) {
        *self.open.lock() = true;
        self.opened.notify_all();
    }

    pub fn waiting(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }

    /// Spin until `n` executions are parked at the gate.
    pub fn wait_for(&self, n: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.waiting() < n {
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        true
    }
}

/// Counters shared by every probe instance of one registry.
#[derive(Default)]
pub struct ProbeStats {
    pub created: AtomicUsize,
    pub initialized: AtomicUsize,
    pub disposed: AtomicUsize,
    pub executions: AtomicUsize,
    pub gate: Gate,
}

impl ProbeStats {
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn initialized(&self) -> usize {
        self.initialized.load(Ordering::SeqCst)
    }

    pub fn disposed(&self) -> usize {
        self.disposed.load(Ordering::SeqCst)
    }

    pub fn executions(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }
}

/// Test component driven by its `mode` attribute.
///
/// Echoes `value` upper-cased, counts its own runs and increments the
/// in/out `counter` attribute.
pub struct Probe {
    id: i64,
    runs: i64,
    attrs: AttrStore,
    stats: Arc<ProbeStats>,
}

impl Bindable for Probe {
    fn attrs(&self) -> &AttrStore {
        &self.attrs
    }

    fn attrs_mut(&mut self) -> &mut AttrStore {
        &mut self.attrs
    }
}

impl ProcessingComponent for Probe {
    fn init(&mut self) -> Result<(), ProcessingError> {
        if self.attrs.str("label") == Some("fail-init") {
            return Err(ProcessingError::corrupting("init refused"));
        }
        self.stats.initialized.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn execute(&mut self) -> Result<(), ProcessingError> {
        self.stats.executions.fetch_add(1, Ordering::SeqCst);
        match self.attrs.str("mode").unwrap_or("ok") {
            "recoverable" => return Err(ProcessingError::recoverable("probe asked to fail")),
            "corrupt" => return Err(ProcessingError::corrupting("probe state corrupted")),
            "panic" => panic!("probe panicked"),
            "gate" => self.stats.gate.pass(),
            _ => {}
        }

        let value = self.attrs.str("value").unwrap_or_default().to_string();
        let max_len = self.attrs.i64("max_value_len").unwrap_or(50) as usize;
        if value.len() > max_len {
            return Err(ProcessingError::recoverable(format!("value longer than {}", max_len)));
        }

        self.runs += 1;
        let counter = self.attrs.i64("counter").unwrap_or(0) + 1;
        let tags = self.attrs.string_array("tags").join(",");
        self.attrs.set("echo", value.to_uppercase());
        self.attrs.set("instance_id", self.id);
        self.attrs.set("runs", self.runs);
        self.attrs.set("counter", counter);
        self.attrs.set("tag_list", tags);
        Ok(())
    }

    fn dispose(&mut self) {
        self.stats.disposed.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn probe_schema() -> AttrSchema {
    AttrSchema::new(vec![
        AttrDescriptor::string("label")
            .init()
            .constraint(Constraint::non_empty())
            .default_value("probe")
            .unwrap(),
        AttrDescriptor::integer("max_value_len")
            .init()
            .constraint(Constraint::int_range(1, 100))
            .default_value(50)
            .unwrap(),
        AttrDescriptor::string("value").required().no_default().unwrap(),
        AttrDescriptor::string("mode")
            .constraint(Constraint::one_of(["ok", "recoverable", "corrupt", "gate", "panic"]))
            .default_value("ok")
            .unwrap(),
        AttrDescriptor::string_array("tags")
            .default_values("a", ["b"])
            .unwrap(),
        AttrDescriptor::integer("counter").in_out().default_value(0).unwrap(),
        AttrDescriptor::string("echo").output().no_default().unwrap(),
        AttrDescriptor::integer("instance_id").output().no_default().unwrap(),
        AttrDescriptor::integer("runs").output().no_default().unwrap(),
        AttrDescriptor::string("tag_list").output().no_default().unwrap(),
    ])
    .unwrap()
}

/// Send controller logs to the test output; `RUST_LOG` overrides the filter.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}

/// Registry with the probe and a factory that always fails.
pub fn probe_registry() -> (ComponentRegistry, Arc<ProbeStats>) {
    init_tracing();
    let stats = Arc::new(ProbeStats::default());
    let mut registry = ComponentRegistry::new();

    let probe_stats = stats.clone();
    registry.register(Arc::new(FnComponentFactory::new(PROBE, probe_schema(), move || {
        let id = probe_stats.created.fetch_add(1, Ordering::SeqCst) as i64 + 1;
        Ok(Box::new(Probe {
            id,
            runs: 0,
            attrs: AttrStore::new(),
            stats: probe_stats.clone(),
        }) as Box<dyn ProcessingComponent>)
    })));

    registry.register(Arc::new(FnComponentFactory::new(
        BROKEN,
        AttrSchema::new(Vec::new()).unwrap(),
        || Err(ProcessingError::corrupting("cannot build component")),
    )));

    (registry, stats)
}

pub fn controller_with(config: ControllerConfig) -> (Controller, Arc<ProbeStats>) {
    let (registry, stats) = probe_registry();
    (Controller::new(registry, config), stats)
}

/// Initialized controller using `strategy` and default settings.
pub fn started(strategy: Strategy) -> (Controller, Arc<ProbeStats>) {
    let (controller, stats) = controller_with(ControllerConfig {
        strategy,
        ..ControllerConfig::default()
    });
    controller.init(AttributeSet::new()).unwrap();
    (controller, stats)
}

pub fn request(value: &str) -> AttributeSet {
    AttributeSet::new().with("value", value)
}

pub fn gated(value: &str) -> AttributeSet {
    request(value).with("mode", "gate")
}

pub const WAIT: Duration = Duration::from_secs(5);
