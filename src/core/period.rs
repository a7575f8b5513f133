//! Calendar windows used by periodic goals.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Period {
    Month,
    Quarter,
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Period::Month => "Month",
                Period::Quarter => "Quarter",
            }
        )
    }
}

impl Period {
    /// First instant of the period containing `now`.
    pub fn start(&self, now: NaiveDateTime) -> NaiveDateTime {
        let month = match self {
            Period::Month => now.month(),
            Period::Quarter => quarter_start_month(now.month()),
        };
        first_of_month(now.year(), month)
    }

    /// Whether `timestamp` falls on or after the start of the period containing `now`.
    pub fn contains(&self, now: NaiveDateTime, timestamp: NaiveDateTime) -> bool {
        timestamp >= self.start(now)
    }

    /// Fraction of the period elapsed by `now`, as used for pacing.
    ///
    /// Quarters approximate every month as 30 days.
    pub fn elapsed_fraction(&self, now: NaiveDateTime) -> f64 {
        let day = f64::from(now.day());
        match self {
            Period::Month => day / f64::from(days_in_month(now.year(), now.month())),
            Period::Quarter => {
                let month_in_quarter = f64::from(now.month0() % 3);
                (month_in_quarter + day / 30.0) / 3.0
            }
        }
    }

    /// Human label such as "October 2026" or "Q4 2026".
    pub fn label(&self, now: NaiveDateTime) -> String {
        match self {
            Period::Month => now.format("%B %Y").to_string(),
            Period::Quarter => format!("Q{} {}", now.month0() / 3 + 1, now.year()),
        }
    }
}

fn quarter_start_month(month: u32) -> u32 {
    (month - 1) / 3 * 3 + 1
}

fn first_of_month(year: i32, month: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, 1)
        .unwrap_or(NaiveDate::MIN)
        .and_time(NaiveTime::MIN)
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map_or(31, |d| d.day())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_period_starts() {
        let now = at(2026, 8, 19, 15, 45);
        assert_eq!(Period::Month.start(now), at(2026, 8, 1, 0, 0));
        assert_eq!(Period::Quarter.start(now), at(2026, 7, 1, 0, 0));
        assert_eq!(Period::Quarter.start(at(2026, 3, 31, 23, 59)), at(2026, 1, 1, 0, 0));
        assert_eq!(Period::Quarter.start(at(2026, 12, 1, 0, 0)), at(2026, 10, 1, 0, 0));
    }

    #[test]
    fn test_quarter_boundary_is_inclusive() {
        let now = at(2026, 5, 10, 9, 0);
        let quarter_start = at(2026, 4, 1, 0, 0);
        assert!(Period::Quarter.contains(now, quarter_start));
        assert!(!Period::Quarter.contains(now, quarter_start - Duration::milliseconds(1)));
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2026, 2), 28);
        assert_eq!(days_in_month(2028, 2), 29);
        assert_eq!(days_in_month(2026, 4), 30);
        assert_eq!(days_in_month(2026, 12), 31);
    }

    #[test]
    fn test_elapsed_fraction() {
        let now = at(2026, 4, 15, 12, 0);
        assert!((Period::Month.elapsed_fraction(now) - 0.5).abs() < 1e-9);
        // First month of the quarter, half way through.
        assert!((Period::Quarter.elapsed_fraction(now) - 0.5 / 3.0).abs() < 1e-9);

        let late = at(2026, 6, 30, 12, 0);
        assert!((Period::Quarter.elapsed_fraction(late) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_labels() {
        let now = at(2026, 10, 19, 8, 0);
        assert_eq!(Period::Month.label(now), "October 2026");
        assert_eq!(Period::Quarter.label(now), "Q4 2026");
    }
}
