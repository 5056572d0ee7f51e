//! grc-risk
//!
//! Core of the global risk gate:
//! - Tumbling time-window tracker (loss totals, streaks, order counts)
//! - Per-strategy / system-wide state registry
//! - Ordered, short-circuiting tier evaluator with a sticky pause latch
//! - Read-only status projections
//!
//! Deterministic, pure logic. No IO, no clock reads — callers supply the
//! current instant on every operation.

mod evaluator;
mod registry;
mod report;
mod types;
mod window;

pub use evaluator::check_trading_allowed;
pub use registry::{RiskRegistry, StrategyRiskState, SystemState, EMERGENCY_PAUSE_REASON};
pub use report::{build_status_report, PausedStrategy, StatusReport, StrategyStatus, SystemStatus};
pub use types::{fmt_micros, EvalInstant, GateVerdict, ReasonCode, StateUpdate, WindowKind};
pub use window::{TimeWindowState, WindowEvent};
