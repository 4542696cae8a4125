use chrono::Weekday;
use enumset::{EnumSet, EnumSetType};

use crate::holiday::HolidayRule;

/// Catalog of the standard US holidays.
#[derive(Debug, EnumSetType)]
pub enum StandardHoliday {
    NewYears,
    Mlk,
    Presidents,
    Memorial,
    Juneteenth,
    Independence,
    Labor,
    Columbus,
    Veterans,
    Thanksgiving,
    Christmas,
}

impl StandardHoliday {
    /// Identifier used in the configuration.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::NewYears => "new_years",
            Self::Mlk => "mlk",
            Self::Presidents => "presidents",
            Self::Memorial => "memorial",
            Self::Juneteenth => "juneteenth",
            Self::Independence => "independence",
            Self::Labor => "labor",
            Self::Columbus => "columbus",
            Self::Veterans => "veterans",
            Self::Thanksgiving => "thanksgiving",
            Self::Christmas => "christmas",
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::NewYears => "New Year's Day",
            Self::Mlk => "MLK Jr. Day",
            Self::Presidents => "Presidents' Day",
            Self::Memorial => "Memorial Day",
            Self::Juneteenth => "Juneteenth",
            Self::Independence => "Independence Day",
            Self::Labor => "Labor Day",
            Self::Columbus => "Columbus Day",
            Self::Veterans => "Veterans Day",
            Self::Thanksgiving => "Thanksgiving",
            Self::Christmas => "Christmas Day",
        }
    }

    #[must_use]
    pub const fn rule(self) -> HolidayRule {
        match self {
            Self::NewYears => HolidayRule::Fixed { month: 1, day: 1 },
            Self::Mlk => HolidayRule::NthWeekday { month: 1, weekday: Weekday::Mon, n: 3 },
            Self::Presidents => HolidayRule::NthWeekday { month: 2, weekday: Weekday::Mon, n: 3 },
            Self::Memorial => HolidayRule::LastWeekday { month: 5, weekday: Weekday::Mon },
            Self::Juneteenth => HolidayRule::Fixed { month: 6, day: 19 },
            Self::Independence => HolidayRule::Fixed { month: 7, day: 4 },
            Self::Labor => HolidayRule::NthWeekday { month: 9, weekday: Weekday::Mon, n: 1 },
            Self::Columbus => HolidayRule::NthWeekday { month: 10, weekday: Weekday::Mon, n: 2 },
            Self::Veterans => HolidayRule::Fixed { month: 11, day: 11 },
            Self::Thanksgiving => {
                HolidayRule::NthWeekday { month: 11, weekday: Weekday::Thu, n: 4 }
            }
            Self::Christmas => HolidayRule::Fixed { month: 12, day: 25 },
        }
    }

    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        EnumSet::<Self>::all().into_iter().find(|holiday| holiday.id() == id)
    }
}
