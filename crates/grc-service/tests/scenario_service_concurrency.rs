//! Many strategy tasks hammering one shared service from real threads.

use std::sync::Arc;
use std::thread;

use grc_policy::PolicyConfig;
use grc_risk::{EvalInstant, StateUpdate};
use grc_service::{ManualClock, RiskGateService};

const M: i64 = 1_000_000;

#[test]
fn concurrent_updates_keep_the_system_aggregate_consistent() {
    let clock = ManualClock::new(EvalInstant::new(0, "10:00:00"));
    let service = Arc::new(RiskGateService::with_clock(
        PolicyConfig::default(),
        Box::new(clock),
    ));

    let threads: Vec<_> = (0..8)
        .map(|i| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                let id = format!("strategy-{i}");
                service.register(&id);
                // Ratchet the position up, then settle at the final value.
                for step in 1..=50 {
                    service.update_state(&id, &StateUpdate::position_value(step * M));
                    service.check_trading_allowed(&id);
                }
                service.update_state(&id, &StateUpdate::total_pnl(5 * M));
            })
        })
        .collect();
    for t in threads {
        t.join().unwrap();
    }

    let report = service.status_report();
    assert_eq!(report.strategies.len(), 8);
    // Each strategy ends at 50, and position updates apply deltas, so the
    // aggregate is exactly the sum of final positions.
    assert_eq!(report.system.total_position_value_micros, 8 * 50 * M);
    for status in report.strategies.values() {
        assert_eq!(status.position_value_micros, 50 * M);
        assert_eq!(status.total_pnl_micros, 5 * M);
        assert!(!status.is_paused);
    }
}

#[test]
fn emergency_stop_races_with_checks_without_losing_the_latch() {
    let clock = ManualClock::new(EvalInstant::new(0, "10:00:00"));
    let service = Arc::new(RiskGateService::with_clock(
        PolicyConfig::default(),
        Box::new(clock),
    ));
    for i in 0..4 {
        service.register(&format!("s{i}"));
    }

    let checkers: Vec<_> = (0..4)
        .map(|i| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                let id = format!("s{i}");
                for _ in 0..200 {
                    service.check_trading_allowed(&id);
                }
            })
        })
        .collect();

    let affected = service.emergency_pause_all();
    assert_eq!(affected.len(), 4);
    for t in checkers {
        t.join().unwrap();
    }

    // Once the threads drain, every strategy is still latched.
    for i in 0..4 {
        let (allowed, reason) = service.check_trading_allowed(&format!("s{i}"));
        assert!(!allowed);
        assert_eq!(reason.as_deref(), Some("system emergency stop"));
    }
}
