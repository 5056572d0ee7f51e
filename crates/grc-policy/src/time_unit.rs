use serde::{Deserialize, Serialize};

/// Length unit for a tumbling risk window.
///
/// Exhaustively matched everywhere; the 3600 s fallback documented for the
/// original service survives only in [`TimeUnit::parse_legacy`], which is the
/// single place unrecognized boundary strings can still enter.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Minute,
    Hour,
    Day,
    Week,
}

impl TimeUnit {
    /// Seconds in one unit.
    pub const fn unit_seconds(self) -> i64 {
        match self {
            TimeUnit::Minute => 60,
            TimeUnit::Hour => 3_600,
            TimeUnit::Day => 86_400,
            TimeUnit::Week => 604_800,
        }
    }

    /// Window length in seconds for `value` units.
    pub fn window_seconds(self, value: u32) -> i64 {
        self.unit_seconds() * i64::from(value)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeUnit::Minute => "minute",
            TimeUnit::Hour => "hour",
            TimeUnit::Day => "day",
            TimeUnit::Week => "week",
        }
    }

    /// Adjective form used in deny reasons ("hourly loss limit", ...).
    pub fn adjective(self) -> &'static str {
        match self {
            TimeUnit::Minute => "per-minute",
            TimeUnit::Hour => "hourly",
            TimeUnit::Day => "daily",
            TimeUnit::Week => "weekly",
        }
    }

    /// Parse a boundary-supplied unit string.
    ///
    /// Accepts both the canonical singular form and the legacy plural form
    /// used by per-strategy config payloads ("minutes", "hours", ...).
    /// Unrecognized values fall back to [`TimeUnit::Hour`] — the documented
    /// 3600 s default for legacy inputs.
    pub fn parse_legacy(s: &str) -> TimeUnit {
        match s {
            "minute" | "minutes" => TimeUnit::Minute,
            "hour" | "hours" => TimeUnit::Hour,
            "day" | "days" => TimeUnit::Day,
            "week" | "weeks" => TimeUnit::Week,
            _ => TimeUnit::Hour,
        }
    }
}

impl std::fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_seconds_table() {
        assert_eq!(TimeUnit::Minute.unit_seconds(), 60);
        assert_eq!(TimeUnit::Hour.unit_seconds(), 3_600);
        assert_eq!(TimeUnit::Day.unit_seconds(), 86_400);
        assert_eq!(TimeUnit::Week.unit_seconds(), 604_800);
    }

    #[test]
    fn window_seconds_scales_by_value() {
        assert_eq!(TimeUnit::Minute.window_seconds(5), 300);
        assert_eq!(TimeUnit::Hour.window_seconds(2), 7_200);
    }

    #[test]
    fn parse_legacy_accepts_plural_forms() {
        assert_eq!(TimeUnit::parse_legacy("minutes"), TimeUnit::Minute);
        assert_eq!(TimeUnit::parse_legacy("weeks"), TimeUnit::Week);
        assert_eq!(TimeUnit::parse_legacy("day"), TimeUnit::Day);
    }

    #[test]
    fn parse_legacy_unrecognized_defaults_to_hour() {
        assert_eq!(TimeUnit::parse_legacy("fortnights"), TimeUnit::Hour);
        assert_eq!(TimeUnit::parse_legacy(""), TimeUnit::Hour);
    }

    #[test]
    fn serde_roundtrip_is_lowercase() {
        let s = serde_json::to_string(&TimeUnit::Day).unwrap();
        assert_eq!(s, "\"day\"");
        let u: TimeUnit = serde_json::from_str("\"week\"").unwrap();
        assert_eq!(u, TimeUnit::Week);
    }
}
