//! grc-service
//!
//! Composition-root wiring for the global risk gate:
//! - `RiskGateService`: thread-safe, synchronous service wrapping the core
//!   registry and evaluator (no async, no IO — it runs inline in strategy
//!   decision loops)
//! - `Clock` seam so the core stays free of wall-clock reads
//! - `StrategyRiskHandle`: per-strategy convenience handle for controllers,
//!   including translation of legacy per-strategy config payloads
//!
//! There is intentionally no global instance: the embedding process builds
//! one service and hands out `Arc` clones.

mod adapter;
mod clock;
mod service;

pub use adapter::StrategyRiskHandle;
pub use clock::{Clock, ManualClock, SystemClock};
pub use service::RiskGateService;
