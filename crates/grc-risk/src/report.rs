//! Read-only status projections for external consumers. No mutation.

use std::collections::BTreeMap;

use grc_policy::{PolicyConfig, RiskLevel};
use serde::Serialize;

use crate::registry::RiskRegistry;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SystemStatus {
    pub total_position_value_micros: i64,
    pub active_position_coins: u32,
    pub current_max_loss_micros: i64,
    pub risk_level: RiskLevel,
    pub enabled: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StrategyStatus {
    pub total_pnl_micros: i64,
    pub position_value_micros: i64,
    pub consecutive_losses: u32,
    pub is_paused: bool,
    pub pause_reason: Option<String>,
    pub last_trade_secs: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PausedStrategy {
    pub id: String,
    pub reason: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub system: SystemStatus,
    pub strategies: BTreeMap<String, StrategyStatus>,
    pub paused_strategies: Vec<PausedStrategy>,
}

/// Project the registry and config into a snapshot.
pub fn build_status_report(cfg: &PolicyConfig, registry: &RiskRegistry) -> StatusReport {
    let system = registry.system();
    let mut strategies = BTreeMap::new();
    let mut paused = Vec::new();

    for state in registry.strategies() {
        strategies.insert(
            state.strategy_id.clone(),
            StrategyStatus {
                total_pnl_micros: state.total_pnl_micros,
                position_value_micros: state.position_value_micros,
                consecutive_losses: state.consecutive_losses,
                is_paused: state.is_paused_by_risk,
                pause_reason: state.pause_reason.clone(),
                last_trade_secs: state.last_trade_secs,
            },
        );
        if state.is_paused_by_risk {
            paused.push(PausedStrategy {
                id: state.strategy_id.clone(),
                reason: state.pause_reason.clone(),
            });
        }
    }

    StatusReport {
        system: SystemStatus {
            total_position_value_micros: system.total_position_value_micros,
            active_position_coins: system.active_position_coins,
            current_max_loss_micros: system.current_max_loss_micros,
            risk_level: cfg.risk_level,
            enabled: cfg.enabled,
        },
        strategies,
        paused_strategies: paused,
    }
}
