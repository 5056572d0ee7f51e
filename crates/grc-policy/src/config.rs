use serde::{Deserialize, Serialize};

use crate::TimeUnit;

/// Global risk level reported alongside status (informational; the evaluator
/// never branches on it).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

// ---------------------------------------------------------------------------
// Fund tier
// ---------------------------------------------------------------------------

/// Fund thresholds across the system / account / strategy levels.
///
/// All amounts are micros. `None` = no limit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FundPolicy {
    /// System-wide cap on aggregate position value.
    pub system_max_position_value_micros: Option<i64>,

    /// Halt the whole system once a single trade loss this large is observed.
    pub system_max_loss_cutoff_micros: Option<i64>,

    /// System-wide cap on distinct coins with open positions.
    /// Consumed by the position-tracking collaborator, not evaluated here.
    pub system_max_position_coins: Option<u32>,

    /// Account-level loss cap inside one tumbling window of
    /// `account_loss_time_unit` length.
    pub account_loss_limit_micros: Option<i64>,
    pub account_loss_time_unit: TimeUnit,

    /// Strategy lifetime loss stop (compared against total PnL).
    pub strategy_total_loss_limit_micros: Option<i64>,

    /// Strategy lifetime profit stop.
    pub strategy_total_profit_limit_micros: Option<i64>,

    /// Per-trade loss cap. Consumed by the order-sizing collaborator.
    pub strategy_max_loss_per_trade_micros: Option<i64>,

    /// Cap on a single strategy's position value.
    pub strategy_max_position_micros: Option<i64>,
}

impl Default for FundPolicy {
    fn default() -> Self {
        Self {
            system_max_position_value_micros: None,
            system_max_loss_cutoff_micros: None,
            system_max_position_coins: None,
            account_loss_limit_micros: None,
            account_loss_time_unit: TimeUnit::Day,
            strategy_total_loss_limit_micros: None,
            strategy_total_profit_limit_micros: None,
            strategy_max_loss_per_trade_micros: None,
            strategy_max_position_micros: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Time tier
// ---------------------------------------------------------------------------

/// Wall-clock trading restrictions.
///
/// Times are "HH:MM:SS" strings compared lexicographically. A range that
/// crosses midnight (e.g. 22:00:00–02:00:00) never matches; known limitation,
/// preserved pending product clarification.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimePolicy {
    /// Restrict trading to [trading_start_time, trading_end_time].
    pub trading_time_limit: bool,
    pub trading_start_time: Option<String>,
    pub trading_end_time: Option<String>,

    /// Forbid trading within 5 minutes of any listed time-of-day point.
    pub time_point_limit: bool,
    pub forbidden_time_points: Vec<String>,
}

// ---------------------------------------------------------------------------
// Trade-protection tier
// ---------------------------------------------------------------------------

/// Streak and frequency protection, each over its own tumbling window.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeProtectionPolicy {
    /// Deny once this many consecutive losses land inside the window.
    pub consecutive_loss_limit: Option<u32>,
    pub consecutive_loss_window: Option<u32>,
    pub consecutive_loss_window_unit: TimeUnit,

    /// Deny once this many orders land inside the window.
    pub order_frequency_limit: Option<u32>,
    pub order_frequency_window: Option<u32>,
    pub order_frequency_window_unit: TimeUnit,
}

impl Default for TradeProtectionPolicy {
    fn default() -> Self {
        Self {
            consecutive_loss_limit: None,
            consecutive_loss_window: None,
            consecutive_loss_window_unit: TimeUnit::Hour,
            order_frequency_limit: None,
            order_frequency_window: None,
            order_frequency_window_unit: TimeUnit::Minute,
        }
    }
}

impl TradeProtectionPolicy {
    /// Window length in seconds for the consecutive-loss window.
    /// Defaults to one unit when the window value is unset.
    pub fn consecutive_loss_window_seconds(&self) -> i64 {
        self.consecutive_loss_window_unit
            .window_seconds(self.consecutive_loss_window.unwrap_or(1))
    }

    /// Window length in seconds for the order-frequency window.
    pub fn order_frequency_window_seconds(&self) -> i64 {
        self.order_frequency_window_unit
            .window_seconds(self.order_frequency_window.unwrap_or(1))
    }
}

// ---------------------------------------------------------------------------
// Market / intelligent tiers (pass-through)
// ---------------------------------------------------------------------------

/// Market monitoring thresholds. Carried for collaborators (volatility and
/// liquidity monitors); never evaluated by the core gate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketPolicy {
    pub price_volatility_monitoring: bool,
    /// Basis points (3.00% = 300).
    pub volatility_threshold_bps: u32,
    pub volatility_window: u32,
    pub volatility_window_unit: TimeUnit,
    /// Free-form method tag understood by the monitor ("highLow", ...).
    pub volatility_calculation_method: String,

    pub liquidity_monitoring: bool,
    /// Basis points (0.50% = 50).
    pub max_allowed_slippage_bps: u32,
}

impl Default for MarketPolicy {
    fn default() -> Self {
        Self {
            price_volatility_monitoring: false,
            volatility_threshold_bps: 300,
            volatility_window: 5,
            volatility_window_unit: TimeUnit::Minute,
            volatility_calculation_method: "highLow".to_string(),
            liquidity_monitoring: false,
            max_allowed_slippage_bps: 50,
        }
    }
}

/// Adaptive protections toggled per deployment. Collaborator-consumed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntelligentPolicy {
    pub volatility_adjusted_stop_loss: bool,
    pub hedging_protection: bool,
}

// ---------------------------------------------------------------------------
// Aggregate
// ---------------------------------------------------------------------------

/// The full policy tree. Owned by the service and replaced or field-merged
/// wholesale; immutable from the evaluator's point of view.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub fund: FundPolicy,
    pub time: TimePolicy,
    pub trade_protection: TradeProtectionPolicy,
    pub market: MarketPolicy,
    pub intelligent: IntelligentPolicy,

    pub risk_level: RiskLevel,

    /// Master switch: when false, every gate check allows immediately.
    pub enabled: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            fund: FundPolicy::default(),
            time: TimePolicy::default(),
            trade_protection: TradeProtectionPolicy::default(),
            market: MarketPolicy::default(),
            intelligent: IntelligentPolicy::default(),
            risk_level: RiskLevel::Medium,
            enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_mean_no_limits() {
        let cfg = PolicyConfig::default();
        assert!(cfg.enabled);
        assert_eq!(cfg.risk_level, RiskLevel::Medium);
        assert!(cfg.fund.account_loss_limit_micros.is_none());
        assert_eq!(cfg.fund.account_loss_time_unit, TimeUnit::Day);
        assert!(cfg.trade_protection.consecutive_loss_limit.is_none());
        assert_eq!(
            cfg.trade_protection.consecutive_loss_window_unit,
            TimeUnit::Hour
        );
        assert_eq!(
            cfg.trade_protection.order_frequency_window_unit,
            TimeUnit::Minute
        );
    }

    #[test]
    fn window_seconds_default_to_one_unit_when_unset() {
        let tp = TradeProtectionPolicy::default();
        assert_eq!(tp.consecutive_loss_window_seconds(), 3_600);
        assert_eq!(tp.order_frequency_window_seconds(), 60);
    }

    #[test]
    fn full_config_deserializes_from_partial_json() {
        let cfg: PolicyConfig = serde_json::from_str(
            r#"{"fund": {"account_loss_limit_micros": 100000000, "account_loss_time_unit": "hour"}}"#,
        )
        .unwrap();
        assert_eq!(cfg.fund.account_loss_limit_micros, Some(100_000_000));
        assert_eq!(cfg.fund.account_loss_time_unit, TimeUnit::Hour);
        // Everything else keeps defaults.
        assert!(cfg.enabled);
        assert!(cfg.fund.strategy_total_loss_limit_micros.is_none());
    }
}
