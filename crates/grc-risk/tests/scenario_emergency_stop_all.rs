use grc_policy::PolicyConfig;
use grc_risk::*;

#[test]
fn scenario_emergency_stop_pauses_every_strategy_until_individual_reset() {
    let cfg = PolicyConfig::default();
    let mut reg = RiskRegistry::new();
    reg.register("a");
    reg.register("b");
    reg.register("c");

    let affected = reg.emergency_pause_all();
    assert_eq!(affected.len(), 3);

    let now = EvalInstant::new(0, "10:00:00");
    for id in ["a", "b", "c"] {
        let verdict = check_trading_allowed(&cfg, &mut reg, id, &now);
        assert!(!verdict.allowed);
        assert_eq!(verdict.code, ReasonCode::StickyPaused);
        assert_eq!(verdict.reason.as_deref(), Some("system emergency stop"));
    }

    // Resets are per strategy; the others stay paused.
    reg.reset_pause("b");
    assert!(check_trading_allowed(&cfg, &mut reg, "b", &now).allowed);
    assert!(!check_trading_allowed(&cfg, &mut reg, "a", &now).allowed);
    assert!(!check_trading_allowed(&cfg, &mut reg, "c", &now).allowed);

    // Strategies registered after the stop are not paused.
    reg.register("d");
    assert!(check_trading_allowed(&cfg, &mut reg, "d", &now).allowed);
}
