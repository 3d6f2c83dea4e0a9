use std::sync::{Arc, Barrier};
use std::thread;

use xcluster::Strategy;

use super::helpers::*;

#[test]
fn test_checked_out_never_exceeds_in_flight() {
    const THREADS: usize = 4;
    let (controller, stats) = started(Strategy::Pooling);
    let controller = Arc::new(controller);
    let stats_ref = stats.clone();

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let controller = controller.clone();
            thread::spawn(move || controller.process(gated(&format!("t{t}")), PROBE))
        })
        .collect();

    assert!(stats_ref.gate.wait_for(THREADS, WAIT), "requests never reached the gate");
    let pool = controller.pool_stats(PROBE);
    assert_eq!(controller.in_flight(PROBE), THREADS);
    assert_eq!(pool.checked_out, THREADS);
    assert!(pool.checked_out <= controller.in_flight(PROBE));
    assert_eq!(pool.created, THREADS as u64);

    stats.gate.open();
    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    let pool = controller.pool_stats(PROBE);
    assert_eq!(controller.in_flight(PROBE), 0);
    assert_eq!(pool.checked_out, 0);
    assert_eq!(pool.idle, THREADS);
    assert_eq!(pool.peak_checked_out, THREADS);

    // a second, sequential wave reuses the idle instances
    for _ in 0..THREADS {
        controller.process(request("again"), PROBE).unwrap();
    }
    assert_eq!(stats.created(), THREADS);
}

#[test]
fn test_concurrent_requests_do_not_share_state() {
    const THREADS: usize = 8;
    const REQUESTS: usize = 25;
    let (controller, stats) = started(Strategy::Pooling);
    let controller = Arc::new(controller);
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let controller = controller.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                for r in 0..REQUESTS {
                    let value = format!("t{t}-r{r}");
                    let tags = vec![format!("tag{t}")];
                    let result = controller
                        .process(request(&value).with("tags", tags), PROBE)
                        .unwrap();
                    let attrs = result.attributes();
                    assert_eq!(attrs.get_str("echo"), Some(value.to_uppercase().as_str()));
                    assert_eq!(attrs.get_str("tag_list").map(str::to_string), Some(format!("tag{t}")));
                    assert_eq!(attrs.get_i64("counter"), Some(1));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(stats.executions(), THREADS * REQUESTS);
    assert!(stats.created() <= THREADS);
    let pool = controller.pool_stats(PROBE);
    assert_eq!(pool.checked_out, 0);
    assert!(pool.peak_checked_out <= THREADS);
    assert_eq!(pool.idle, stats.created());
}

#[test]
fn test_simple_strategy_under_concurrency() {
    const THREADS: usize = 4;
    let (controller, stats) = started(Strategy::Simple);
    let controller = Arc::new(controller);

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let controller = controller.clone();
            thread::spawn(move || {
                for r in 0..5 {
                    controller.process(request(&format!("{t}:{r}")), PROBE).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(stats.created(), THREADS * 5);
    assert_eq!(stats.disposed(), THREADS * 5);
    assert_eq!(controller.pool_stats(PROBE).idle, 0);
}
