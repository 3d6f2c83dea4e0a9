use std::sync::Arc;
use std::thread;
use std::time::Duration;

use xcluster::error::{ControllerError, LifecycleError};
use xcluster::{AttributeSet, Controller, ControllerState, Strategy};

use super::helpers::*;

#[test]
fn test_dispose_waits_for_in_flight_requests() {
    let (controller, stats) = started(Strategy::Pooling);
    let controller = Arc::new(controller);

    let worker = {
        let controller = controller.clone();
        thread::spawn(move || controller.process(gated("slow"), PROBE))
    };
    assert!(stats.gate.wait_for(1, WAIT));

    let disposer = {
        let controller = controller.clone();
        thread::spawn(move || controller.dispose())
    };

    thread::sleep(Duration::from_millis(50));
    assert!(!disposer.is_finished(), "dispose returned while a request was running");
    assert_eq!(controller.state(), ControllerState::Disposed);
    assert!(matches!(
        controller.process(request("late"), PROBE),
        Err(ControllerError::Lifecycle(LifecycleError::Disposed))
    ));
    assert_eq!(stats.disposed(), 0);

    stats.gate.open();
    let result = worker.join().unwrap().unwrap();
    assert_eq!(result.attributes().get_str("echo"), Some("SLOW"));
    disposer.join().unwrap().unwrap();
    assert_eq!(stats.disposed(), 1);
}

#[test]
fn test_dispose_drain_timeout() {
    let (registry, stats) = probe_registry();
    let controller = Arc::new(
        Controller::builder()
            .registry(registry)
            .strategy(Strategy::Pooling)
            .drain_timeout(Duration::from_millis(50))
            .build()
            .unwrap(),
    );
    controller.init(AttributeSet::new()).unwrap();

    let worker = {
        let controller = controller.clone();
        thread::spawn(move || controller.process(gated("stuck"), PROBE))
    };
    assert!(stats.gate.wait_for(1, WAIT));

    let err = controller.dispose().unwrap_err();
    assert!(matches!(
        err,
        ControllerError::Lifecycle(LifecycleError::DrainTimeout { remaining: 1 })
    ));
    assert_eq!(controller.state(), ControllerState::Disposed);
    assert_eq!(stats.disposed(), 0);

    stats.gate.open();
    worker.join().unwrap().unwrap();
    // released into a closed pool
    assert_eq!(stats.disposed(), 1);
    assert_eq!(controller.total_in_flight(), 0);
}

#[test]
fn test_dispose_with_nothing_in_flight_returns_immediately() {
    let (controller, stats) = started(Strategy::Pooling);
    controller.process(request("a"), PROBE).unwrap();
    controller.dispose().unwrap();
    assert_eq!(stats.disposed(), 1);
    assert_eq!(controller.pool_stats(PROBE), Default::default());
}
