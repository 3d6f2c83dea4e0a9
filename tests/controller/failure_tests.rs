use xcluster::error::{ControllerError, ErrorCode, ProcessingError};
use xcluster::{AttributeSet, ControllerConfig, Strategy};

use super::helpers::*;

fn processing_error(err: ControllerError) -> ProcessingError {
    match err {
        ControllerError::Processing(e) => e,
        other => panic!("expected processing error, got {other:?}"),
    }
}

#[test]
fn test_recoverable_failure_returns_instance() {
    let (controller, stats) = started(Strategy::Pooling);
    let err = controller
        .process(request("x").with("mode", "recoverable"), PROBE)
        .unwrap_err();
    assert!(err.is_recoverable());
    assert_eq!(err.error_context().code, ErrorCode::ProcessingError);

    let pool = controller.pool_stats(PROBE);
    assert_eq!(pool.idle, 1);
    assert_eq!(pool.discarded, 0);

    let result = controller.process(request("y"), PROBE).unwrap();
    assert_eq!(result.attributes().get_i64("instance_id"), Some(1));
    assert_eq!(stats.disposed(), 0);
}

#[test]
fn test_corrupting_failure_discards_instance() {
    let (controller, stats) = started(Strategy::Pooling);
    let err = controller
        .process(request("x").with("mode", "corrupt"), PROBE)
        .unwrap_err();
    assert_eq!(err.error_context().code, ErrorCode::ComponentCorrupted);
    assert!(!processing_error(err).recoverable);

    assert_eq!(stats.disposed(), 1);
    let pool = controller.pool_stats(PROBE);
    assert_eq!(pool.idle, 0);
    assert_eq!(pool.discarded, 1);
    assert_eq!(pool.checked_out, 0);

    let result = controller.process(request("y"), PROBE).unwrap();
    assert_eq!(result.attributes().get_i64("instance_id"), Some(2));
}

#[test]
fn test_panicking_component_is_discarded() {
    let (controller, stats) = started(Strategy::Pooling);
    let err = controller
        .process(request("x").with("mode", "panic"), PROBE)
        .unwrap_err();
    let e = processing_error(err);
    assert!(!e.recoverable);
    assert!(e.cause.contains("probe panicked"));
    assert_eq!(stats.disposed(), 1);
    assert_eq!(controller.total_in_flight(), 0);
    controller.process(request("y"), PROBE).unwrap();
}

#[test]
fn test_recoverable_failure_from_init_attribute_limit() {
    let (controller, _) = controller_with(ControllerConfig {
        strategy: Strategy::Pooling,
        ..ControllerConfig::default()
    });
    controller
        .init(AttributeSet::new().with("max_value_len", 3))
        .unwrap();
    let e = processing_error(controller.process(request("abcd"), PROBE).unwrap_err());
    assert!(e.recoverable);
    assert_eq!(e.cause, "value longer than 3");
    controller.process(request("abc"), PROBE).unwrap();
}

#[test]
fn test_factory_failure() {
    let (controller, _) = started(Strategy::Pooling);
    let e = processing_error(controller.process(AttributeSet::new(), BROKEN).unwrap_err());
    assert_eq!(e.cause, "cannot build component");
    let pool = controller.pool_stats(BROKEN);
    assert_eq!(pool.checked_out, 0);
    assert_eq!(pool.created, 0);
    assert_eq!(controller.in_flight(BROKEN), 0);
}

#[test]
fn test_init_hook_failure_disposes_instance() {
    let (controller, stats) = controller_with(ControllerConfig {
        strategy: Strategy::Pooling,
        ..ControllerConfig::default()
    });
    controller
        .init(AttributeSet::new().with("label", "fail-init"))
        .unwrap();
    let e = processing_error(controller.process(request("x"), PROBE).unwrap_err());
    assert_eq!(e.cause, "init refused");
    assert_eq!(stats.created(), 1);
    assert_eq!(stats.disposed(), 1);
    assert_eq!(controller.pool_stats(PROBE).checked_out, 0);
}
