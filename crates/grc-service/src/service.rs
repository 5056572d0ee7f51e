//! The shared risk gate service.
//!
//! Lock layout per the concurrency model: the read-mostly policy config
//! lives behind an `RwLock`; the registry (per-strategy state plus the
//! shared system aggregates) behind a single `Mutex`, since any
//! `update_state` can touch both a strategy's counters and the system
//! aggregate. Lock order is always config before registry. Poisoned locks
//! are recovered rather than propagated — a panicking strategy task must
//! not take the gate down with it.

use std::sync::{Mutex, MutexGuard, RwLock};

use anyhow::Context;
use grc_policy::{PolicyConfig, PolicyPatch};
use grc_risk::{
    build_status_report, check_trading_allowed, EvalInstant, RiskRegistry, StateUpdate,
    StatusReport,
};
use serde_json::Value;
use tracing::{info, warn};

use crate::clock::{Clock, SystemClock};

pub struct RiskGateService {
    config: RwLock<PolicyConfig>,
    registry: Mutex<RiskRegistry>,
    clock: Box<dyn Clock + Send + Sync>,
}

impl RiskGateService {
    pub fn new(config: PolicyConfig) -> Self {
        Self::with_clock(config, Box::new(SystemClock))
    }

    pub fn with_clock(config: PolicyConfig, clock: Box<dyn Clock + Send + Sync>) -> Self {
        Self {
            config: RwLock::new(config),
            registry: Mutex::new(RiskRegistry::new()),
            clock,
        }
    }

    // -- lifecycle ---------------------------------------------------------

    pub fn register(&self, strategy_id: &str) {
        if self.lock_registry().register(strategy_id) {
            info!(strategy_id, "registered strategy with risk gate");
        }
    }

    pub fn unregister(&self, strategy_id: &str) {
        if self.lock_registry().unregister(strategy_id) {
            info!(strategy_id, "unregistered strategy from risk gate");
        }
    }

    // -- state updates -----------------------------------------------------

    pub fn update_state(&self, strategy_id: &str, update: &StateUpdate) {
        let now = self.clock.now();
        let cfg = self.read_config().clone();
        self.lock_registry()
            .update_state(strategy_id, update, &cfg, now.epoch_secs);
    }

    // -- gate check --------------------------------------------------------

    /// The decision-loop entry point: `(allowed, deny reason)`.
    pub fn check_trading_allowed(&self, strategy_id: &str) -> (bool, Option<String>) {
        let now = self.clock.now();
        let cfg = self.read_config().clone();
        let verdict = {
            let mut registry = self.lock_registry();
            check_trading_allowed(&cfg, &mut registry, strategy_id, &now)
        };

        if !verdict.allowed && verdict.code.is_sticky() {
            warn!(
                strategy_id,
                code = ?verdict.code,
                reason = verdict.reason.as_deref().unwrap_or(""),
                "strategy paused by risk gate"
            );
        }
        verdict.into_pair()
    }

    // -- pause management --------------------------------------------------

    pub fn reset_pause(&self, strategy_id: &str) {
        if self.lock_registry().reset_pause(strategy_id) {
            info!(strategy_id, "risk pause reset");
        }
    }

    /// Pause every registered strategy. Returns the affected ids.
    pub fn emergency_pause_all(&self) -> Vec<String> {
        let affected = self.lock_registry().emergency_pause_all();
        warn!(
            affected = affected.len(),
            "emergency stop: all strategies paused"
        );
        affected
    }

    pub fn reset_system_max_loss(&self) {
        self.lock_registry().reset_system_max_loss();
        info!("system max-loss aggregate reset");
    }

    // -- config ------------------------------------------------------------

    pub fn config(&self) -> PolicyConfig {
        self.read_config().clone()
    }

    /// Replace the whole policy tree (the only way to clear a threshold back
    /// to "no limit").
    pub fn replace_config(&self, config: PolicyConfig) {
        *self.write_config() = config;
        info!("risk policy config replaced");
    }

    /// Merge only the provided sub-tree fields.
    pub fn update_config(&self, patch: &PolicyPatch) {
        let mut config = self.write_config();
        *config = config.merged(patch);
        info!(enabled = config.enabled, "risk policy config updated");
    }

    /// JSON boundary for the management layer. Unknown keys are silently
    /// dropped; structurally invalid values are the caller's error.
    pub fn update_config_json(&self, value: &Value) -> anyhow::Result<()> {
        let patch = PolicyPatch::from_value(value).context("malformed risk policy patch")?;
        self.update_config(&patch);
        Ok(())
    }

    // -- reporting ---------------------------------------------------------

    pub fn status_report(&self) -> StatusReport {
        let cfg = self.read_config().clone();
        let registry = self.lock_registry();
        build_status_report(&cfg, &registry)
    }

    /// Current instant as the service sees it (exposed for collaborators
    /// that want to log decisions against the same clock).
    pub fn now(&self) -> EvalInstant {
        self.clock.now()
    }

    // -- lock helpers ------------------------------------------------------

    fn lock_registry(&self) -> MutexGuard<'_, RiskRegistry> {
        self.registry.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn read_config(&self) -> std::sync::RwLockReadGuard<'_, PolicyConfig> {
        self.config.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_config(&self) -> std::sync::RwLockWriteGuard<'_, PolicyConfig> {
        self.config.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for RiskGateService {
    fn default() -> Self {
        Self::new(PolicyConfig::default())
    }
}
