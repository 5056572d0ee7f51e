//! Per-strategy adapter handle.
//!
//! Controllers hold one `StrategyRiskHandle` each: it registers on
//! construction, forwards gate checks and state updates, and can translate
//! the legacy camelCase per-strategy risk payload into a policy patch so
//! existing controller configs integrate without changes.

use anyhow::bail;
use std::sync::Arc;

use grc_policy::{
    FundPolicyPatch, IntelligentPolicyPatch, PolicyPatch, TimePolicyPatch, TimeUnit,
    TradeProtectionPolicyPatch, MICROS_SCALE,
};
use grc_risk::StateUpdate;
use serde_json::Value;
use tracing::info;

use crate::service::RiskGateService;

pub struct StrategyRiskHandle {
    service: Arc<RiskGateService>,
    strategy_id: String,
}

impl StrategyRiskHandle {
    /// Registers `strategy_id` with the service.
    pub fn new(service: Arc<RiskGateService>, strategy_id: impl Into<String>) -> Self {
        let strategy_id = strategy_id.into();
        service.register(&strategy_id);
        Self {
            service,
            strategy_id,
        }
    }

    pub fn strategy_id(&self) -> &str {
        &self.strategy_id
    }

    pub fn check_trading_allowed(&self) -> (bool, Option<String>) {
        self.service.check_trading_allowed(&self.strategy_id)
    }

    pub fn update_state(&self, update: &StateUpdate) {
        self.service.update_state(&self.strategy_id, update);
    }

    pub fn reset_pause(&self) {
        self.service.reset_pause(&self.strategy_id);
    }

    /// Unregister and consume the handle.
    pub fn release(self) {
        self.service.unregister(&self.strategy_id);
    }

    /// Translate a legacy per-strategy risk config (camelCase keys, plain
    /// currency units, plural time-unit strings) into a policy patch and
    /// apply it to the shared service.
    pub fn apply_legacy_config(&self, legacy: &Value) -> anyhow::Result<()> {
        let patch = legacy_patch(legacy)?;
        self.service.update_config(&patch);
        info!(
            strategy_id = %self.strategy_id,
            "applied legacy strategy risk config to the shared gate"
        );
        Ok(())
    }
}

/// Build a [`PolicyPatch`] from the legacy payload. Unknown keys are
/// ignored; recognized keys with unusable values (wrong JSON type) are
/// ignored too, matching the tolerant legacy ingester.
pub(crate) fn legacy_patch(legacy: &Value) -> anyhow::Result<PolicyPatch> {
    let Some(map) = legacy.as_object() else {
        bail!("legacy risk config must be a JSON object");
    };

    let fund = FundPolicyPatch {
        strategy_total_loss_limit_micros: map.get("totalLossLimit").and_then(money_micros),
        strategy_total_profit_limit_micros: map.get("totalProfitLimit").and_then(money_micros),
        strategy_max_loss_per_trade_micros: map.get("maxLossPerTrade").and_then(money_micros),
        strategy_max_position_micros: map.get("maxPosition").and_then(money_micros),
        ..Default::default()
    };

    let time = TimePolicyPatch {
        trading_time_limit: map.get("tradingTimeLimit").and_then(Value::as_bool),
        trading_start_time: map.get("tradingStartTime").and_then(as_string),
        trading_end_time: map.get("tradingEndTime").and_then(as_string),
        time_point_limit: map.get("timePointLimit").and_then(Value::as_bool),
        forbidden_time_points: map.get("forbiddenTimePoints").and_then(string_list),
    };

    let tp = TradeProtectionPolicyPatch {
        consecutive_loss_limit: map.get("consecutiveLossLimit").and_then(as_u32),
        consecutive_loss_window: map.get("consecutiveLossWindow").and_then(as_u32),
        consecutive_loss_window_unit: map
            .get("consecutiveLossWindowUnit")
            .and_then(Value::as_str)
            .map(TimeUnit::parse_legacy),
        order_frequency_limit: map.get("orderFrequencyLimit").and_then(as_u32),
        order_frequency_window: map.get("orderFrequencyWindow").and_then(as_u32),
        order_frequency_window_unit: map
            .get("orderFrequencyWindowUnit")
            .and_then(Value::as_str)
            .map(TimeUnit::parse_legacy),
    };

    let intelligent = IntelligentPolicyPatch {
        volatility_adjusted_stop_loss: map
            .get("volatilityAdjustedStopLoss")
            .and_then(Value::as_bool),
        hedging_protection: map.get("hedgingProtection").and_then(Value::as_bool),
    };

    Ok(PolicyPatch {
        fund: non_empty(fund, |f| {
            f.strategy_total_loss_limit_micros.is_none()
                && f.strategy_total_profit_limit_micros.is_none()
                && f.strategy_max_loss_per_trade_micros.is_none()
                && f.strategy_max_position_micros.is_none()
        }),
        time: non_empty(time, |t| {
            t.trading_time_limit.is_none()
                && t.trading_start_time.is_none()
                && t.trading_end_time.is_none()
                && t.time_point_limit.is_none()
                && t.forbidden_time_points.is_none()
        }),
        trade_protection: non_empty(tp, |t| {
            t.consecutive_loss_limit.is_none()
                && t.consecutive_loss_window.is_none()
                && t.consecutive_loss_window_unit.is_none()
                && t.order_frequency_limit.is_none()
                && t.order_frequency_window.is_none()
                && t.order_frequency_window_unit.is_none()
        }),
        intelligent: non_empty(intelligent, |i| {
            i.volatility_adjusted_stop_loss.is_none() && i.hedging_protection.is_none()
        }),
        ..Default::default()
    })
}

fn non_empty<T>(patch: T, is_empty: impl Fn(&T) -> bool) -> Option<T> {
    if is_empty(&patch) {
        None
    } else {
        Some(patch)
    }
}

/// Legacy money values are plain currency units; convert to micros.
fn money_micros(v: &Value) -> Option<i64> {
    v.as_f64().map(|f| (f * MICROS_SCALE as f64).round() as i64)
}

fn as_u32(v: &Value) -> Option<u32> {
    v.as_u64().and_then(|n| u32::try_from(n).ok())
}

fn as_string(v: &Value) -> Option<String> {
    v.as_str().map(str::to_string)
}

fn string_list(v: &Value) -> Option<Vec<String>> {
    let list = v.as_array()?;
    Some(
        list.iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
    )
}
