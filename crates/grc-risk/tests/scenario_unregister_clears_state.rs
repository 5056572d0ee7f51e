use grc_policy::PolicyConfig;
use grc_risk::*;

const M: i64 = 1_000_000;

#[test]
fn scenario_unregister_then_reregister_yields_zeroed_state() {
    let mut cfg = PolicyConfig::default();
    cfg.fund.strategy_total_loss_limit_micros = Some(50 * M);
    cfg.trade_protection.consecutive_loss_limit = Some(5);
    cfg.trade_protection.consecutive_loss_window = Some(1);

    let mut reg = RiskRegistry::new();
    reg.register("s1");
    reg.update_state("s1", &StateUpdate::total_pnl(-60 * M), &cfg, 0);
    reg.update_state("s1", &StateUpdate::trade_result(-M), &cfg, 1);

    let now = EvalInstant::new(10, "09:00:00");
    assert!(!check_trading_allowed(&cfg, &mut reg, "s1", &now).allowed);
    assert!(reg.strategy("s1").unwrap().is_paused_by_risk);

    reg.unregister("s1");
    reg.register("s1");

    let state = reg.strategy("s1").unwrap();
    assert_eq!(state.total_pnl_micros, 0);
    assert_eq!(state.consecutive_losses, 0);
    assert!(state.windows.is_empty());
    assert!(!state.is_paused_by_risk);
    assert!(state.pause_reason.is_none());

    // With zeroed counters nothing denies any more.
    assert!(check_trading_allowed(&cfg, &mut reg, "s1", &now).allowed);
}
