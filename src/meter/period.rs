use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Period after which an accumulator starts over.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetPeriod {
    Day,

    /// ISO week, starting on Monday.
    Week,

    Month,
}

impl ResetPeriod {
    pub const ALL: [Self; 3] = [Self::Day, Self::Week, Self::Month];

    /// First date of the period which contains the date.
    #[must_use]
    pub fn boundary(self, date: NaiveDate) -> NaiveDate {
        match self {
            Self::Day => date,
            Self::Week => date - Days::new(u64::from(date.weekday().num_days_from_monday())),
            Self::Month => date - Days::new(u64::from(date.day0())),
        }
    }

    /// Check whether the accumulator last reset at `last_reset` must reset for `boundary`.
    #[must_use]
    pub fn is_crossed(self, last_reset: Option<NaiveDate>, boundary: NaiveDate) -> bool {
        match self {
            Self::Day => last_reset != Some(boundary),
            Self::Week | Self::Month => last_reset.is_none_or(|last_reset| last_reset < boundary),
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Day => "Cost Today",
            Self::Week => "Cost This Week",
            Self::Month => "Cost This Month",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_boundary() {
        // 2025-10-17 is a Friday.
        assert_eq!(ResetPeriod::Day.boundary(date(2025, 10, 17)), date(2025, 10, 17));
        assert_eq!(ResetPeriod::Week.boundary(date(2025, 10, 17)), date(2025, 10, 13));
        assert_eq!(ResetPeriod::Week.boundary(date(2025, 10, 13)), date(2025, 10, 13));
        assert_eq!(ResetPeriod::Week.boundary(date(2025, 10, 19)), date(2025, 10, 13));
        assert_eq!(ResetPeriod::Month.boundary(date(2025, 10, 17)), date(2025, 10, 1));
        // The week may start in the previous year.
        assert_eq!(ResetPeriod::Week.boundary(date(2026, 1, 1)), date(2025, 12, 29));
    }

    #[test]
    fn test_is_crossed() {
        let boundary = date(2025, 10, 13);
        for period in ResetPeriod::ALL {
            assert!(period.is_crossed(None, boundary));
            assert!(period.is_crossed(Some(date(2025, 10, 6)), boundary));
            assert!(!period.is_crossed(Some(boundary), boundary));
        }
        // A stale reading from before the stored boundary does not reset weeks and months.
        assert!(ResetPeriod::Day.is_crossed(Some(date(2025, 10, 14)), boundary));
        assert!(!ResetPeriod::Week.is_crossed(Some(date(2025, 10, 20)), boundary));
        assert!(!ResetPeriod::Month.is_crossed(Some(date(2025, 11, 1)), date(2025, 10, 1)));
    }
}
