use grc_policy::PolicyConfig;
use grc_risk::*;

const M: i64 = 1_000_000;

#[test]
fn scenario_profit_stop_latches_like_a_loss_stop() {
    let mut cfg = PolicyConfig::default();
    cfg.fund.strategy_total_profit_limit_micros = Some(200 * M);

    let mut reg = RiskRegistry::new();
    reg.register("s1");

    // Exactly at the limit is still allowed (the check is strictly greater).
    reg.update_state("s1", &StateUpdate::total_pnl(200 * M), &cfg, 0);
    let now = EvalInstant::new(10, "10:00:00");
    assert!(check_trading_allowed(&cfg, &mut reg, "s1", &now).allowed);

    reg.update_state("s1", &StateUpdate::total_pnl(201 * M), &cfg, 20);
    let verdict = check_trading_allowed(&cfg, &mut reg, "s1", &now);
    assert!(!verdict.allowed);
    assert_eq!(verdict.code, ReasonCode::StrategyTotalProfit);
    assert!(reg.strategy("s1").unwrap().is_paused_by_risk);
}

#[test]
fn scenario_max_position_applies_per_strategy_not_system_wide() {
    let mut cfg = PolicyConfig::default();
    cfg.fund.strategy_max_position_micros = Some(100 * M);

    let mut reg = RiskRegistry::new();
    reg.register("big");
    reg.register("small");
    reg.update_state("big", &StateUpdate::position_value(150 * M), &cfg, 0);
    reg.update_state("small", &StateUpdate::position_value(40 * M), &cfg, 0);

    let now = EvalInstant::new(10, "10:00:00");
    let verdict = check_trading_allowed(&cfg, &mut reg, "big", &now);
    assert!(!verdict.allowed);
    assert_eq!(verdict.code, ReasonCode::StrategyMaxPosition);

    // The aggregate is 190 but no system limit is set; the other strategy
    // is untouched.
    assert!(check_trading_allowed(&cfg, &mut reg, "small", &now).allowed);
}

#[test]
fn scenario_unknown_strategy_passes_strategy_tier() {
    let mut cfg = PolicyConfig::default();
    cfg.fund.strategy_total_loss_limit_micros = Some(M);

    let mut reg = RiskRegistry::new();
    let now = EvalInstant::new(10, "10:00:00");
    // Nothing registered: no per-strategy state to evaluate, so allow.
    assert!(check_trading_allowed(&cfg, &mut reg, "nobody", &now).allowed);
}
