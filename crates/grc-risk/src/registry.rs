//! Strategy / account state registry.
//!
//! The registry exclusively owns every `StrategyRiskState` and the shared
//! `SystemState`. Strategy states are created lazily (register or first
//! update — upsert semantics) and removed on unregister; a re-register
//! starts from zeroed counters.

use std::collections::BTreeMap;

use grc_policy::{PolicyConfig, TimeUnit};

use crate::types::{StateUpdate, WindowKind};
use crate::window::{TimeWindowState, WindowEvent};

/// Pause reason applied by `emergency_pause_all`.
pub const EMERGENCY_PAUSE_REASON: &str = "system emergency stop";

/// Per-strategy risk counters and the sticky pause latch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StrategyRiskState {
    pub strategy_id: String,
    /// Lifetime PnL as reported by the caller (overwritten, never summed).
    pub total_pnl_micros: i64,
    /// Absolute current position value as last reported.
    pub position_value_micros: i64,
    pub last_trade_secs: Option<i64>,
    pub windows: BTreeMap<WindowKind, TimeWindowState>,
    /// Streak across all time (the windowed streak lives in `windows`).
    pub consecutive_losses: u32,
    /// Sticky: set by a strategy-tier denial or emergency stop, cleared only
    /// by an explicit pause reset — later favorable state does not clear it.
    pub is_paused_by_risk: bool,
    pub pause_reason: Option<String>,
}

impl StrategyRiskState {
    fn new(strategy_id: &str) -> Self {
        Self {
            strategy_id: strategy_id.to_string(),
            total_pnl_micros: 0,
            position_value_micros: 0,
            last_trade_secs: None,
            windows: BTreeMap::new(),
            consecutive_losses: 0,
            is_paused_by_risk: false,
            pause_reason: None,
        }
    }
}

/// System-wide aggregates shared by every strategy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SystemState {
    /// Maintained incrementally: each position update applies
    /// `new - old`, never a recompute from scratch.
    pub total_position_value_micros: i64,
    /// Populated by the position-tracking collaborator; carried, not derived.
    pub active_position_coins: u32,
    /// Worst single-trade loss ever observed; monotone until an explicit
    /// reset.
    pub current_max_loss_micros: i64,
    /// Account-level loss windows, one per configured time unit.
    pub account_windows: BTreeMap<TimeUnit, TimeWindowState>,
}

impl SystemState {
    fn new() -> Self {
        Self {
            total_position_value_micros: 0,
            active_position_coins: 0,
            current_max_loss_micros: 0,
            account_windows: BTreeMap::new(),
        }
    }
}

impl Default for SystemState {
    fn default() -> Self {
        Self::new()
    }
}

/// Lifecycle and storage for all risk state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RiskRegistry {
    strategies: BTreeMap<String, StrategyRiskState>,
    system: SystemState,
}

impl RiskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent: creates a zeroed state if absent. Returns `true` when a
    /// new state was created.
    pub fn register(&mut self, strategy_id: &str) -> bool {
        if self.strategies.contains_key(strategy_id) {
            return false;
        }
        self.strategies
            .insert(strategy_id.to_string(), StrategyRiskState::new(strategy_id));
        true
    }

    /// Remove a strategy's state entirely. Returns `true` if it existed.
    pub fn unregister(&mut self, strategy_id: &str) -> bool {
        self.strategies.remove(strategy_id).is_some()
    }

    pub fn strategy(&self, strategy_id: &str) -> Option<&StrategyRiskState> {
        self.strategies.get(strategy_id)
    }

    pub fn strategy_mut(&mut self, strategy_id: &str) -> Option<&mut StrategyRiskState> {
        self.strategies.get_mut(strategy_id)
    }

    pub fn strategies(&self) -> impl Iterator<Item = &StrategyRiskState> {
        self.strategies.values()
    }

    pub fn system(&self) -> &SystemState {
        &self.system
    }

    /// Apply one state update (upsert: unknown strategies are registered).
    ///
    /// A trade result feeds up to three windows independently: the
    /// strategy's order-frequency window, the strategy's consecutive-loss
    /// window, and the account-level loss window — each only when its limit
    /// is configured.
    pub fn update_state(
        &mut self,
        strategy_id: &str,
        update: &StateUpdate,
        cfg: &PolicyConfig,
        now_secs: i64,
    ) {
        let state = self
            .strategies
            .entry(strategy_id.to_string())
            .or_insert_with(|| StrategyRiskState::new(strategy_id));

        if let Some(pnl) = update.total_pnl_micros {
            state.total_pnl_micros = pnl;
        }

        if let Some(position) = update.position_value_micros {
            let delta = position.saturating_sub(state.position_value_micros);
            state.position_value_micros = position;
            self.system.total_position_value_micros =
                self.system.total_position_value_micros.saturating_add(delta);
        }

        if let Some(result) = update.trade_result_micros {
            state.last_trade_secs = Some(now_secs);

            if result < 0 {
                state.consecutive_losses = state.consecutive_losses.saturating_add(1);
                let loss = result.saturating_abs();
                if loss > self.system.current_max_loss_micros {
                    self.system.current_max_loss_micros = loss;
                }
            } else {
                state.consecutive_losses = 0;
            }

            let event = WindowEvent::from_trade_result(result);
            let tp = &cfg.trade_protection;

            if tp.order_frequency_limit.is_some() {
                record_window(
                    &mut state.windows,
                    WindowKind::OrderFrequency,
                    now_secs,
                    tp.order_frequency_window_seconds(),
                    &event,
                );
            }

            if tp.consecutive_loss_limit.is_some() {
                record_window(
                    &mut state.windows,
                    WindowKind::ConsecutiveLoss,
                    now_secs,
                    tp.consecutive_loss_window_seconds(),
                    &event,
                );
            }

            if cfg.fund.account_loss_limit_micros.is_some() {
                let unit = cfg.fund.account_loss_time_unit;
                let length = unit.window_seconds(1);
                match self.system.account_windows.get_mut(&unit) {
                    Some(w) => w.record(now_secs, length, &event),
                    None => {
                        self.system
                            .account_windows
                            .insert(unit, TimeWindowState::open(now_secs, length, &event));
                    }
                }
            }
        }
    }

    /// Clear the sticky pause only; counters are untouched. Returns `true`
    /// if the strategy existed.
    pub fn reset_pause(&mut self, strategy_id: &str) -> bool {
        match self.strategies.get_mut(strategy_id) {
            Some(state) => {
                state.is_paused_by_risk = false;
                state.pause_reason = None;
                true
            }
            None => false,
        }
    }

    /// Pause every registered strategy. Returns the affected ids.
    pub fn emergency_pause_all(&mut self) -> Vec<String> {
        let mut affected = Vec::with_capacity(self.strategies.len());
        for state in self.strategies.values_mut() {
            state.is_paused_by_risk = true;
            state.pause_reason = Some(EMERGENCY_PAUSE_REASON.to_string());
            affected.push(state.strategy_id.clone());
        }
        affected
    }

    /// Explicit reset of the monotone worst-loss aggregate.
    pub fn reset_system_max_loss(&mut self) {
        self.system.current_max_loss_micros = 0;
    }
}

fn record_window(
    windows: &mut BTreeMap<WindowKind, TimeWindowState>,
    kind: WindowKind,
    now_secs: i64,
    length_secs: i64,
    event: &WindowEvent,
) {
    match windows.get_mut(&kind) {
        Some(w) => w.record(now_secs, length_secs, event),
        None => {
            windows.insert(kind, TimeWindowState::open(now_secs, length_secs, event));
        }
    }
}
