use serde::Serialize;

/// The moment an operation is evaluated at, supplied by the caller.
///
/// The core never reads a clock; the service layer builds one of these per
/// call. `time_of_day` is local wall-clock "HH:MM:SS", used only by the time
/// tier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalInstant {
    pub epoch_secs: i64,
    pub time_of_day: String,
}

impl EvalInstant {
    pub fn new(epoch_secs: i64, time_of_day: impl Into<String>) -> Self {
        Self {
            epoch_secs,
            time_of_day: time_of_day.into(),
        }
    }
}

/// Which per-strategy tumbling window a counter lives in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum WindowKind {
    OrderFrequency,
    ConsecutiveLoss,
}

/// One state-update request. Any subset of fields may be present.
///
/// - `total_pnl_micros` overwrites (never accumulates) the strategy PnL.
/// - `position_value_micros` is the absolute current position value; the
///   registry applies the delta to the system aggregate.
/// - `trade_result_micros` is one closed trade's result (loss < 0).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StateUpdate {
    pub total_pnl_micros: Option<i64>,
    pub position_value_micros: Option<i64>,
    pub trade_result_micros: Option<i64>,
}

impl StateUpdate {
    pub fn total_pnl(micros: i64) -> Self {
        Self {
            total_pnl_micros: Some(micros),
            ..Default::default()
        }
    }

    pub fn position_value(micros: i64) -> Self {
        Self {
            position_value_micros: Some(micros),
            ..Default::default()
        }
    }

    pub fn trade_result(micros: i64) -> Self {
        Self {
            trade_result_micros: Some(micros),
            ..Default::default()
        }
    }
}

/// Why a gate check denied (or that it allowed).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    Allowed,

    /// Sticky latch from an earlier strategy-tier denial or emergency stop.
    StickyPaused,

    // System tier (transient, re-evaluated each call)
    SystemPositionValue,
    SystemMaxLoss,
    AccountWindowLoss,

    // Time tier (transient)
    OutsideTradingHours,
    ForbiddenTimePoint,

    // Strategy tier (sets the sticky pause)
    StrategyTotalLoss,
    StrategyTotalProfit,
    StrategyMaxPosition,
    ConsecutiveLossLimit,
    OrderFrequencyLimit,
}

impl ReasonCode {
    /// Strategy-tier codes latch `is_paused_by_risk` on denial.
    pub fn is_sticky(self) -> bool {
        matches!(
            self,
            ReasonCode::StrategyTotalLoss
                | ReasonCode::StrategyTotalProfit
                | ReasonCode::StrategyMaxPosition
                | ReasonCode::ConsecutiveLossLimit
                | ReasonCode::OrderFrequencyLimit
        )
    }
}

/// Outcome of one `check_trading_allowed` call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GateVerdict {
    pub allowed: bool,
    pub code: ReasonCode,
    pub reason: Option<String>,
}

impl GateVerdict {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            code: ReasonCode::Allowed,
            reason: None,
        }
    }

    pub fn deny(code: ReasonCode, reason: String) -> Self {
        Self {
            allowed: false,
            code,
            reason: Some(reason),
        }
    }

    /// Collapse to the `(allowed, reason)` pair the external interface uses.
    pub fn into_pair(self) -> (bool, Option<String>) {
        (self.allowed, self.reason)
    }
}

/// Format a micros amount as a decimal string for deny reasons
/// ("120.000000").
pub fn fmt_micros(micros: i64) -> String {
    let units = micros / 1_000_000;
    let frac = (micros % 1_000_000).abs();
    if micros < 0 && units == 0 {
        format!("-{units}.{frac:06}")
    } else {
        format!("{units}.{frac:06}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fmt_micros_positive_and_negative() {
        assert_eq!(fmt_micros(1_500_000), "1.500000");
        assert_eq!(fmt_micros(-2_750_000), "-2.750000");
        assert_eq!(fmt_micros(-500_000), "-0.500000");
        assert_eq!(fmt_micros(0), "0.000000");
    }

    #[test]
    fn sticky_codes_are_exactly_the_strategy_tier() {
        assert!(ReasonCode::StrategyTotalLoss.is_sticky());
        assert!(ReasonCode::OrderFrequencyLimit.is_sticky());
        assert!(!ReasonCode::SystemMaxLoss.is_sticky());
        assert!(!ReasonCode::OutsideTradingHours.is_sticky());
        assert!(!ReasonCode::StickyPaused.is_sticky());
        assert!(!ReasonCode::Allowed.is_sticky());
    }

    #[test]
    fn verdict_into_pair() {
        assert_eq!(GateVerdict::allow().into_pair(), (true, None));
        let (ok, reason) =
            GateVerdict::deny(ReasonCode::SystemMaxLoss, "too big".to_string()).into_pair();
        assert!(!ok);
        assert_eq!(reason.as_deref(), Some("too big"));
    }
}
