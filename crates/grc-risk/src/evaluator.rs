//! Tiered gate evaluator — one decision per call.
//!
//! Tier order is deliberate: system-wide and time-based constraints are
//! cheap, shared, and veto before the strategy-specific (and stickier)
//! constraints are consulted. System and time denials are transient and
//! re-evaluated each call; only a strategy-tier denial latches
//! `is_paused_by_risk`.

use grc_policy::{FundPolicy, PolicyConfig, TimePolicy};

use crate::registry::{RiskRegistry, StrategyRiskState, SystemState};
use crate::types::{fmt_micros, EvalInstant, GateVerdict, ReasonCode, WindowKind};

/// Proximity buffer around a forbidden time point.
const FORBIDDEN_POINT_BUFFER_SECS: i64 = 5 * 60;

/// Evaluate whether `strategy_id` may trade right now.
///
/// Mutates the registry only on a strategy-tier denial (sets the sticky
/// pause before returning).
pub fn check_trading_allowed(
    cfg: &PolicyConfig,
    registry: &mut RiskRegistry,
    strategy_id: &str,
    now: &EvalInstant,
) -> GateVerdict {
    // 1) Master switch: disabled short-circuits everything, tripped
    //    thresholds included.
    if !cfg.enabled {
        return GateVerdict::allow();
    }

    // 2) Sticky latch dominates all later tiers.
    if let Some(state) = registry.strategy(strategy_id) {
        if state.is_paused_by_risk {
            let reason = state
                .pause_reason
                .clone()
                .unwrap_or_else(|| "paused by risk control".to_string());
            return GateVerdict::deny(ReasonCode::StickyPaused, reason);
        }
    }

    // 3) System tier — transient veto, never latches.
    if let Some(verdict) = check_system_tier(&cfg.fund, registry.system()) {
        return verdict;
    }

    // 4) Time tier — transient veto.
    if let Some(verdict) = check_time_tier(&cfg.time, now) {
        return verdict;
    }

    // 5) Strategy tier — denial latches the sticky pause.
    if let Some(state) = registry.strategy(strategy_id) {
        if let Some(verdict) = check_strategy_tier(cfg, state) {
            if let Some(state) = registry.strategy_mut(strategy_id) {
                state.is_paused_by_risk = true;
                state.pause_reason = verdict.reason.clone();
            }
            return verdict;
        }
    }

    GateVerdict::allow()
}

fn check_system_tier(fund: &FundPolicy, system: &SystemState) -> Option<GateVerdict> {
    if let Some(limit) = fund.system_max_position_value_micros {
        if system.total_position_value_micros >= limit {
            return Some(GateVerdict::deny(
                ReasonCode::SystemPositionValue,
                format!(
                    "system position value {} >= limit {}",
                    fmt_micros(system.total_position_value_micros),
                    fmt_micros(limit)
                ),
            ));
        }
    }

    if let Some(cutoff) = fund.system_max_loss_cutoff_micros {
        if system.current_max_loss_micros >= cutoff {
            return Some(GateVerdict::deny(
                ReasonCode::SystemMaxLoss,
                format!(
                    "system max single-trade loss {} >= cutoff {}",
                    fmt_micros(system.current_max_loss_micros),
                    fmt_micros(cutoff)
                ),
            ));
        }
    }

    if let Some(limit) = fund.account_loss_limit_micros {
        let unit = fund.account_loss_time_unit;
        if let Some(window) = system.account_windows.get(&unit) {
            if window.total_loss_micros >= limit {
                return Some(GateVerdict::deny(
                    ReasonCode::AccountWindowLoss,
                    format!(
                        "{} account loss {} >= limit {}",
                        unit.adjective(),
                        fmt_micros(window.total_loss_micros),
                        fmt_micros(limit)
                    ),
                ));
            }
        }
    }

    None
}

fn check_time_tier(time: &TimePolicy, now: &EvalInstant) -> Option<GateVerdict> {
    if time.trading_time_limit {
        if let (Some(start), Some(end)) = (&time.trading_start_time, &time.trading_end_time) {
            // Lexicographic HH:MM:SS comparison. Known limitation: a range
            // crossing midnight (22:00:00-02:00:00) never matches.
            let tod = now.time_of_day.as_str();
            if !(start.as_str() <= tod && tod <= end.as_str()) {
                return Some(GateVerdict::deny(
                    ReasonCode::OutsideTradingHours,
                    format!("time {tod} outside trading hours {start}-{end}"),
                ));
            }
        }
    }

    if time.time_point_limit {
        if let Some(current) = seconds_of_day(&now.time_of_day) {
            for point in &time.forbidden_time_points {
                // Malformed config entries are skipped, never an error.
                let Some(point_secs) = seconds_of_day(point) else {
                    continue;
                };
                // Date-agnostic absolute difference. Known limitation: no
                // wrap at midnight, so a point near 00:00:00 only matches on
                // one side of the boundary.
                if (current - point_secs).abs() <= FORBIDDEN_POINT_BUFFER_SECS {
                    return Some(GateVerdict::deny(
                        ReasonCode::ForbiddenTimePoint,
                        format!(
                            "time {} within 5 minutes of forbidden point {point}",
                            now.time_of_day
                        ),
                    ));
                }
            }
        }
    }

    None
}

fn check_strategy_tier(cfg: &PolicyConfig, state: &StrategyRiskState) -> Option<GateVerdict> {
    let fund = &cfg.fund;

    if let Some(limit) = fund.strategy_total_loss_limit_micros {
        if state.total_pnl_micros < -limit {
            return Some(GateVerdict::deny(
                ReasonCode::StrategyTotalLoss,
                format!(
                    "strategy total loss {} exceeds limit {}",
                    fmt_micros(-state.total_pnl_micros),
                    fmt_micros(limit)
                ),
            ));
        }
    }

    if let Some(limit) = fund.strategy_total_profit_limit_micros {
        if state.total_pnl_micros > limit {
            return Some(GateVerdict::deny(
                ReasonCode::StrategyTotalProfit,
                format!(
                    "strategy total profit {} exceeds limit {}",
                    fmt_micros(state.total_pnl_micros),
                    fmt_micros(limit)
                ),
            ));
        }
    }

    if let Some(limit) = fund.strategy_max_position_micros {
        if state.position_value_micros > limit {
            return Some(GateVerdict::deny(
                ReasonCode::StrategyMaxPosition,
                format!(
                    "strategy position value {} exceeds limit {}",
                    fmt_micros(state.position_value_micros),
                    fmt_micros(limit)
                ),
            ));
        }
    }

    let tp = &cfg.trade_protection;

    if let Some(limit) = tp.consecutive_loss_limit {
        if let Some(window) = state.windows.get(&WindowKind::ConsecutiveLoss) {
            if window.consecutive_losses >= limit {
                return Some(GateVerdict::deny(
                    ReasonCode::ConsecutiveLossLimit,
                    format!(
                        "consecutive losses {} >= limit {limit}",
                        window.consecutive_losses
                    ),
                ));
            }
        }
    }

    if let Some(limit) = tp.order_frequency_limit {
        if let Some(window) = state.windows.get(&WindowKind::OrderFrequency) {
            if window.trade_count >= limit {
                return Some(GateVerdict::deny(
                    ReasonCode::OrderFrequencyLimit,
                    format!("order count {} >= limit {limit} in window", window.trade_count),
                ));
            }
        }
    }

    None
}

/// Parse "HH:MM:SS" to seconds since midnight. Returns `None` for anything
/// malformed.
fn seconds_of_day(s: &str) -> Option<i64> {
    let mut parts = s.split(':');
    let hours: i64 = parts.next()?.parse().ok()?;
    let minutes: i64 = parts.next()?.parse().ok()?;
    let seconds: i64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    if !(0..24).contains(&hours) || !(0..60).contains(&minutes) || !(0..60).contains(&seconds) {
        return None;
    }
    Some(hours * 3_600 + minutes * 60 + seconds)
}
