//! Green/yellow/red pacing of a goal against the share of its period elapsed.

use crate::core::period::Period;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt::Display;

/// Slack applied to the elapsed fraction before a monthly goal turns red.
pub const MONTHLY_SLACK: f64 = 0.8;
/// Quarterly goals get more slack since meetings and leads take longer to land.
pub const QUARTERLY_SLACK: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaceStatus {
    Red,
    Yellow,
    Green,
}

impl PaceStatus {
    pub fn label(&self) -> &'static str {
        match self {
            PaceStatus::Green => "On Track",
            PaceStatus::Yellow => "At Risk",
            PaceStatus::Red => "Behind",
        }
    }
}

impl Display for PaceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Judges progress against the share of the period already gone.
pub fn pace_status(period: Period, actual: f64, target: f64, now: NaiveDateTime) -> PaceStatus {
    if target == 0.0 {
        return PaceStatus::Green;
    }
    let progress = actual / target;
    if progress >= 1.0 {
        return PaceStatus::Green;
    }
    let slack = match period {
        Period::Month => MONTHLY_SLACK,
        Period::Quarter => QUARTERLY_SLACK,
    };
    if progress >= period.elapsed_fraction(now) * slack {
        PaceStatus::Yellow
    } else {
        PaceStatus::Red
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_met_target_is_green() {
        let now = day(2026, 10, 2);
        assert_eq!(pace_status(Period::Month, 3.0, 3.0, now), PaceStatus::Green);
        assert_eq!(pace_status(Period::Quarter, 5.0, 2.0, now), PaceStatus::Green);
    }

    #[test]
    fn test_zero_target_is_green() {
        let now = day(2026, 10, 31);
        assert_eq!(pace_status(Period::Month, 0.0, 0.0, now), PaceStatus::Green);
        assert_eq!(pace_status(Period::Quarter, 0.0, 0.0, now), PaceStatus::Green);
    }

    #[test]
    fn test_monthly_pacing() {
        // Day 15 of 30: elapsed 0.5, threshold 0.4.
        let now = day(2026, 11, 15);
        assert_eq!(pace_status(Period::Month, 2.0, 3.0, now), PaceStatus::Yellow);
        assert_eq!(pace_status(Period::Month, 1.0, 3.0, now), PaceStatus::Red);
        // Day 1 of 30: threshold ~0.027, nothing logged yet is still red.
        let early = day(2026, 11, 1);
        assert_eq!(pace_status(Period::Month, 0.0, 3.0, early), PaceStatus::Red);
        assert_eq!(pace_status(Period::Month, 1.0, 3.0, early), PaceStatus::Yellow);
    }

    #[test]
    fn test_quarterly_pacing() {
        // Second month of the quarter, day 15: elapsed 0.5, threshold 0.35.
        let now = day(2026, 11, 15);
        assert_eq!(pace_status(Period::Quarter, 1.0, 2.0, now), PaceStatus::Yellow);
        assert_eq!(pace_status(Period::Quarter, 1.0, 3.0, now), PaceStatus::Red);
    }

    #[test]
    fn test_status_is_monotonic_in_actual() {
        for now in [day(2026, 1, 1), day(2026, 2, 14), day(2026, 3, 31)] {
            for period in [Period::Month, Period::Quarter] {
                let mut previous = PaceStatus::Red;
                for actual in 0..=6 {
                    let status = pace_status(period, f64::from(actual), 3.0, now);
                    assert!(status >= previous);
                    previous = status;
                }
            }
        }
    }
}
