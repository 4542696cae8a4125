//! Holiday pattern resolution.
//!
//! Every rule resolves to at most one date per calendar year. Optionally, dates that fall
//! on a weekend are observed on the nearest weekday.

mod rule;
mod standard;

use std::collections::BTreeSet;

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use enumset::EnumSet;

pub use self::{
    rule::{CustomHoliday, HolidayRule},
    standard::StandardHoliday,
};
use crate::prelude::*;

/// Resolve a fixed-date holiday.
///
/// Returns [`None`] for non-existent dates, for example, 29th of February in a non-leap year.
#[must_use]
pub fn resolve_fixed(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Resolve the `n`-th (1-based) `weekday` of the month.
///
/// Returns [`None`] when the month has fewer occurrences, for example, the 5th Friday of February.
#[must_use]
pub fn resolve_nth_weekday(year: i32, month: u32, weekday: Weekday, n: u32) -> Option<NaiveDate> {
    let first_day = NaiveDate::from_ymd_opt(year, month, 1)?;
    let offset = days_between(first_day.weekday(), weekday);
    first_day
        .checked_add_days(Days::new(u64::from(offset + 7 * n.saturating_sub(1))))
        .filter(|date| date.month() == month)
}

/// Resolve the last `weekday` of the month.
#[must_use]
pub fn resolve_last_weekday(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    let last_day =
        NaiveDate::from_ymd_opt(year, month, 1)?.checked_add_months(Months::new(1))?.pred_opt()?;
    last_day.checked_sub_days(Days::new(u64::from(days_between(weekday, last_day.weekday()))))
}

/// Observe Saturday holidays on Friday, and Sunday holidays on Monday.
#[must_use]
pub fn observe_nearest_weekday(date: NaiveDate) -> NaiveDate {
    match date.weekday() {
        Weekday::Sat => date.pred_opt().unwrap_or(date),
        Weekday::Sun => date.succ_opt().unwrap_or(date),
        _ => date,
    }
}

/// Resolve all the holiday patterns to concrete dates in the specified year.
///
/// Rules that do not produce a valid date in the year (fixed 29th of February) are skipped.
#[must_use]
pub fn resolve_holidays_for_year(
    standard: EnumSet<StandardHoliday>,
    custom: &[CustomHoliday],
    year: i32,
    shift_observed: bool,
) -> BTreeSet<NaiveDate> {
    let rules = standard
        .iter()
        .map(StandardHoliday::rule)
        .chain(custom.iter().map(|holiday| holiday.rule));
    let mut dates = BTreeSet::new();
    for rule in rules {
        let Some(date) = rule.resolve(year) else {
            debug!(year, ?rule, "the rule does not resolve in this year");
            continue;
        };
        dates.insert(if shift_observed { observe_nearest_weekday(date) } else { date });
    }
    debug!(year, n_dates = dates.len(), "resolved holidays");
    dates
}

/// Number of days to go forward from `from` to reach the next `to` (possibly zero).
const fn days_between(from: Weekday, to: Weekday) -> u32 {
    (to.num_days_from_monday() + 7 - from.num_days_from_monday()) % 7
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_resolve_fixed() {
        assert_eq!(resolve_fixed(2025, 7, 4), Some(date(2025, 7, 4)));
        assert_eq!(resolve_fixed(2025, 2, 29), None);
        assert_eq!(resolve_fixed(2024, 2, 29), Some(date(2024, 2, 29)));
    }

    #[test]
    fn test_resolve_nth_weekday() {
        // MLK Day: third Monday of January.
        assert_eq!(resolve_nth_weekday(2025, 1, Weekday::Mon, 3), Some(date(2025, 1, 20)));
        // Thanksgiving: fourth Thursday of November.
        assert_eq!(resolve_nth_weekday(2025, 11, Weekday::Thu, 4), Some(date(2025, 11, 27)));
        assert_eq!(resolve_nth_weekday(2024, 11, Weekday::Thu, 4), Some(date(2024, 11, 28)));
        // The first day of the month is the first occurrence itself.
        assert_eq!(resolve_nth_weekday(2025, 9, Weekday::Mon, 1), Some(date(2025, 9, 1)));
        // 2025-06-30 is the 5th Monday of June.
        assert_eq!(resolve_nth_weekday(2025, 6, Weekday::Mon, 5), Some(date(2025, 6, 30)));
    }

    #[test]
    fn test_resolve_missing_fifth_weekday() {
        assert_eq!(resolve_nth_weekday(2025, 2, Weekday::Fri, 5), None);
        assert_eq!(resolve_nth_weekday(2025, 12, Weekday::Thu, 5), None);
        let custom = [CustomHoliday {
            name: None,
            rule: HolidayRule::NthWeekday { month: 2, weekday: Weekday::Fri, n: 5 },
        }];
        assert!(resolve_holidays_for_year(EnumSet::empty(), &custom, 2025, true).is_empty());
    }

    #[test]
    fn test_resolve_nth_weekday_stays_in_month() {
        for year in 1990..2060 {
            for month in 1..=12 {
                for weekday in [
                    Weekday::Mon,
                    Weekday::Tue,
                    Weekday::Wed,
                    Weekday::Thu,
                    Weekday::Fri,
                    Weekday::Sat,
                    Weekday::Sun,
                ] {
                    for n in 1..=4 {
                        let resolved = resolve_nth_weekday(year, month, weekday, n).unwrap();
                        assert_eq!(resolved.month(), month);
                        assert_eq!(resolved.weekday(), weekday);
                        if n == 1 {
                            assert!(resolved.day() <= 7);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_resolve_last_weekday() {
        // Memorial Day: last Monday of May.
        assert_eq!(resolve_last_weekday(2025, 5, Weekday::Mon), Some(date(2025, 5, 26)));
        assert_eq!(resolve_last_weekday(2024, 5, Weekday::Mon), Some(date(2024, 5, 27)));
        // The last day of the month matches already: 2025-08-31 is a Sunday.
        assert_eq!(resolve_last_weekday(2025, 8, Weekday::Sun), Some(date(2025, 8, 31)));
        // December wraps into the next year.
        assert_eq!(resolve_last_weekday(2025, 12, Weekday::Wed), Some(date(2025, 12, 31)));
    }

    #[test]
    fn test_observe_nearest_weekday() {
        // 2026-07-04 is a Saturday.
        assert_eq!(observe_nearest_weekday(date(2026, 7, 4)), date(2026, 7, 3));
        // 2027-07-04 is a Sunday.
        assert_eq!(observe_nearest_weekday(date(2027, 7, 4)), date(2027, 7, 5));
        // 2025-07-04 is a Friday.
        assert_eq!(observe_nearest_weekday(date(2025, 7, 4)), date(2025, 7, 4));
    }

    #[test]
    fn test_observe_nearest_weekday_never_lands_on_weekend() {
        let mut day = date(2025, 1, 1);
        while day.year() == 2025 {
            let observed = observe_nearest_weekday(day);
            assert!(!matches!(observed.weekday(), Weekday::Sat | Weekday::Sun));
            if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
                assert_eq!(observed, day);
            }
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_resolve_holidays_for_year() {
        let standard = StandardHoliday::Independence | StandardHoliday::Christmas;
        let custom = [CustomHoliday {
            name: Some("Company day".to_owned()),
            rule: HolidayRule::Fixed { month: 7, day: 3 },
        }];

        // Independence Day 2026 is observed on Friday, the same date as the custom one.
        let shifted = resolve_holidays_for_year(standard, &custom, 2026, true);
        assert_eq!(shifted.into_iter().collect::<Vec<_>>(), [date(2026, 7, 3), date(2026, 12, 25)]);

        let unshifted = resolve_holidays_for_year(standard, &custom, 2026, false);
        assert_eq!(
            unshifted.into_iter().collect::<Vec<_>>(),
            [date(2026, 7, 3), date(2026, 7, 4), date(2026, 12, 25)],
        );
    }

    #[test]
    fn test_resolve_holidays_skips_missing_dates() {
        let custom =
            [CustomHoliday { name: None, rule: HolidayRule::Fixed { month: 2, day: 29 } }];
        assert!(resolve_holidays_for_year(EnumSet::empty(), &custom, 2025, true).is_empty());
        assert_eq!(resolve_holidays_for_year(EnumSet::empty(), &custom, 2024, false).len(), 1);
    }
}
