//! Partial config updates.
//!
//! Each policy struct has a patch mirror with every field `Option`-wrapped
//! and an explicit merge function that enumerates its own fields. Unknown
//! JSON keys are dropped by serde during patch deserialization — a deliberate
//! forward-compatibility choice, not an error.
//!
//! A patch can set or overwrite a threshold but never clear one back to
//! "no limit"; restoring an unlimited field requires replacing the whole
//! config.

use serde::Deserialize;
use serde_json::Value;

use crate::{
    FundPolicy, IntelligentPolicy, MarketPolicy, PolicyConfig, RiskLevel, TimePolicy, TimeUnit,
    TradeProtectionPolicy,
};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct FundPolicyPatch {
    pub system_max_position_value_micros: Option<i64>,
    pub system_max_loss_cutoff_micros: Option<i64>,
    pub system_max_position_coins: Option<u32>,
    pub account_loss_limit_micros: Option<i64>,
    pub account_loss_time_unit: Option<TimeUnit>,
    pub strategy_total_loss_limit_micros: Option<i64>,
    pub strategy_total_profit_limit_micros: Option<i64>,
    pub strategy_max_loss_per_trade_micros: Option<i64>,
    pub strategy_max_position_micros: Option<i64>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct TimePolicyPatch {
    pub trading_time_limit: Option<bool>,
    pub trading_start_time: Option<String>,
    pub trading_end_time: Option<String>,
    pub time_point_limit: Option<bool>,
    pub forbidden_time_points: Option<Vec<String>>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct TradeProtectionPolicyPatch {
    pub consecutive_loss_limit: Option<u32>,
    pub consecutive_loss_window: Option<u32>,
    pub consecutive_loss_window_unit: Option<TimeUnit>,
    pub order_frequency_limit: Option<u32>,
    pub order_frequency_window: Option<u32>,
    pub order_frequency_window_unit: Option<TimeUnit>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct MarketPolicyPatch {
    pub price_volatility_monitoring: Option<bool>,
    pub volatility_threshold_bps: Option<u32>,
    pub volatility_window: Option<u32>,
    pub volatility_window_unit: Option<TimeUnit>,
    pub volatility_calculation_method: Option<String>,
    pub liquidity_monitoring: Option<bool>,
    pub max_allowed_slippage_bps: Option<u32>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct IntelligentPolicyPatch {
    pub volatility_adjusted_stop_loss: Option<bool>,
    pub hedging_protection: Option<bool>,
}

/// Top-level patch: absent sub-trees leave the corresponding sub-config
/// untouched.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct PolicyPatch {
    pub fund: Option<FundPolicyPatch>,
    pub time: Option<TimePolicyPatch>,
    pub trade_protection: Option<TradeProtectionPolicyPatch>,
    pub market: Option<MarketPolicyPatch>,
    pub intelligent: Option<IntelligentPolicyPatch>,
    pub risk_level: Option<RiskLevel>,
    pub enabled: Option<bool>,
}

impl PolicyPatch {
    /// Deserialize a patch from a JSON value. Unknown keys at any level are
    /// silently dropped; structurally invalid values (wrong types) are the
    /// caller's error.
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value.clone())
    }

    pub fn is_empty(&self) -> bool {
        self.fund.is_none()
            && self.time.is_none()
            && self.trade_protection.is_none()
            && self.market.is_none()
            && self.intelligent.is_none()
            && self.risk_level.is_none()
            && self.enabled.is_none()
    }
}

// ---------------------------------------------------------------------------
// Merge functions — one per struct, enumerating its own fields
// ---------------------------------------------------------------------------

impl FundPolicy {
    pub fn merged(&self, p: &FundPolicyPatch) -> FundPolicy {
        FundPolicy {
            system_max_position_value_micros: p
                .system_max_position_value_micros
                .or(self.system_max_position_value_micros),
            system_max_loss_cutoff_micros: p
                .system_max_loss_cutoff_micros
                .or(self.system_max_loss_cutoff_micros),
            system_max_position_coins: p
                .system_max_position_coins
                .or(self.system_max_position_coins),
            account_loss_limit_micros: p
                .account_loss_limit_micros
                .or(self.account_loss_limit_micros),
            account_loss_time_unit: p
                .account_loss_time_unit
                .unwrap_or(self.account_loss_time_unit),
            strategy_total_loss_limit_micros: p
                .strategy_total_loss_limit_micros
                .or(self.strategy_total_loss_limit_micros),
            strategy_total_profit_limit_micros: p
                .strategy_total_profit_limit_micros
                .or(self.strategy_total_profit_limit_micros),
            strategy_max_loss_per_trade_micros: p
                .strategy_max_loss_per_trade_micros
                .or(self.strategy_max_loss_per_trade_micros),
            strategy_max_position_micros: p
                .strategy_max_position_micros
                .or(self.strategy_max_position_micros),
        }
    }
}

impl TimePolicy {
    pub fn merged(&self, p: &TimePolicyPatch) -> TimePolicy {
        TimePolicy {
            trading_time_limit: p.trading_time_limit.unwrap_or(self.trading_time_limit),
            trading_start_time: p
                .trading_start_time
                .clone()
                .or_else(|| self.trading_start_time.clone()),
            trading_end_time: p
                .trading_end_time
                .clone()
                .or_else(|| self.trading_end_time.clone()),
            time_point_limit: p.time_point_limit.unwrap_or(self.time_point_limit),
            forbidden_time_points: p
                .forbidden_time_points
                .clone()
                .unwrap_or_else(|| self.forbidden_time_points.clone()),
        }
    }
}

impl TradeProtectionPolicy {
    pub fn merged(&self, p: &TradeProtectionPolicyPatch) -> TradeProtectionPolicy {
        TradeProtectionPolicy {
            consecutive_loss_limit: p.consecutive_loss_limit.or(self.consecutive_loss_limit),
            consecutive_loss_window: p.consecutive_loss_window.or(self.consecutive_loss_window),
            consecutive_loss_window_unit: p
                .consecutive_loss_window_unit
                .unwrap_or(self.consecutive_loss_window_unit),
            order_frequency_limit: p.order_frequency_limit.or(self.order_frequency_limit),
            order_frequency_window: p.order_frequency_window.or(self.order_frequency_window),
            order_frequency_window_unit: p
                .order_frequency_window_unit
                .unwrap_or(self.order_frequency_window_unit),
        }
    }
}

impl MarketPolicy {
    pub fn merged(&self, p: &MarketPolicyPatch) -> MarketPolicy {
        MarketPolicy {
            price_volatility_monitoring: p
                .price_volatility_monitoring
                .unwrap_or(self.price_volatility_monitoring),
            volatility_threshold_bps: p
                .volatility_threshold_bps
                .unwrap_or(self.volatility_threshold_bps),
            volatility_window: p.volatility_window.unwrap_or(self.volatility_window),
            volatility_window_unit: p
                .volatility_window_unit
                .unwrap_or(self.volatility_window_unit),
            volatility_calculation_method: p
                .volatility_calculation_method
                .clone()
                .unwrap_or_else(|| self.volatility_calculation_method.clone()),
            liquidity_monitoring: p.liquidity_monitoring.unwrap_or(self.liquidity_monitoring),
            max_allowed_slippage_bps: p
                .max_allowed_slippage_bps
                .unwrap_or(self.max_allowed_slippage_bps),
        }
    }
}

impl IntelligentPolicy {
    pub fn merged(&self, p: &IntelligentPolicyPatch) -> IntelligentPolicy {
        IntelligentPolicy {
            volatility_adjusted_stop_loss: p
                .volatility_adjusted_stop_loss
                .unwrap_or(self.volatility_adjusted_stop_loss),
            hedging_protection: p.hedging_protection.unwrap_or(self.hedging_protection),
        }
    }
}

impl PolicyConfig {
    /// Return a new config with only the provided sub-tree fields replaced.
    pub fn merged(&self, p: &PolicyPatch) -> PolicyConfig {
        PolicyConfig {
            fund: match &p.fund {
                Some(fp) => self.fund.merged(fp),
                None => self.fund.clone(),
            },
            time: match &p.time {
                Some(tp) => self.time.merged(tp),
                None => self.time.clone(),
            },
            trade_protection: match &p.trade_protection {
                Some(tp) => self.trade_protection.merged(tp),
                None => self.trade_protection.clone(),
            },
            market: match &p.market {
                Some(mp) => self.market.merged(mp),
                None => self.market.clone(),
            },
            intelligent: match &p.intelligent {
                Some(ip) => self.intelligent.merged(ip),
                None => self.intelligent.clone(),
            },
            risk_level: p.risk_level.unwrap_or(self.risk_level),
            enabled: p.enabled.unwrap_or(self.enabled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_touches_only_provided_fields() {
        let base = PolicyConfig::default();
        let patch = PolicyPatch {
            fund: Some(FundPolicyPatch {
                account_loss_limit_micros: Some(100 * crate::MICROS_SCALE),
                account_loss_time_unit: Some(TimeUnit::Hour),
                ..Default::default()
            }),
            enabled: Some(false),
            ..Default::default()
        };

        let merged = base.merged(&patch);
        assert_eq!(
            merged.fund.account_loss_limit_micros,
            Some(100_000_000)
        );
        assert_eq!(merged.fund.account_loss_time_unit, TimeUnit::Hour);
        assert!(!merged.enabled);
        // Untouched sub-trees are identical.
        assert_eq!(merged.time, base.time);
        assert_eq!(merged.trade_protection, base.trade_protection);
        assert_eq!(merged.fund.strategy_total_loss_limit_micros, None);
        // Original config is unchanged (merge returns a new value).
        assert!(base.enabled);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let patch = PolicyPatch::from_value(&json!({
            "fund": { "account_loss_limit_micros": 5, "not_a_real_field": 42 },
            "future_tier": { "anything": true },
            "enabled": true
        }))
        .unwrap();

        assert_eq!(
            patch.fund.as_ref().unwrap().account_loss_limit_micros,
            Some(5)
        );
        assert_eq!(patch.enabled, Some(true));
    }

    #[test]
    fn wrong_value_type_is_an_error() {
        let err = PolicyPatch::from_value(&json!({
            "fund": { "account_loss_limit_micros": "a lot" }
        }));
        assert!(err.is_err());
    }

    #[test]
    fn empty_patch_merges_to_identical_config() {
        let base = PolicyConfig::default();
        let patch = PolicyPatch::from_value(&json!({})).unwrap();
        assert!(patch.is_empty());
        assert_eq!(base.merged(&patch), base);
    }

    #[test]
    fn time_unit_strings_deserialize_in_patches() {
        let patch = PolicyPatch::from_value(&json!({
            "trade_protection": {
                "order_frequency_limit": 10,
                "order_frequency_window": 1,
                "order_frequency_window_unit": "minute"
            }
        }))
        .unwrap();
        let tp = patch.trade_protection.unwrap();
        assert_eq!(tp.order_frequency_window_unit, Some(TimeUnit::Minute));
        assert_eq!(tp.order_frequency_limit, Some(10));
    }
}
