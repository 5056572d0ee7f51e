//! grc-policy
//!
//! Risk policy configuration model for the global risk gate:
//! - Five-tier policy tree (fund / time / trade-protection / market / intelligent)
//! - Global enabled flag and risk level
//! - Explicit field-by-field partial merge (no reflection over arbitrary keys)
//!
//! All monetary thresholds are fixed-point micros (1 unit = 1_000_000 micros)
//! and optional: an unset threshold means "no limit", never an error.

mod config;
mod patch;
mod time_unit;

pub use config::{
    FundPolicy, IntelligentPolicy, MarketPolicy, PolicyConfig, RiskLevel, TimePolicy,
    TradeProtectionPolicy,
};
pub use patch::{
    FundPolicyPatch, IntelligentPolicyPatch, MarketPolicyPatch, PolicyPatch, TimePolicyPatch,
    TradeProtectionPolicyPatch,
};
pub use time_unit::TimeUnit;

/// Money scale: micros (1e-6).
pub const MICROS_SCALE: i64 = 1_000_000;
