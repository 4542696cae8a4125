use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::holiday::{resolve_fixed, resolve_last_weekday, resolve_nth_weekday};

/// Abstract holiday rule which resolves to one date per calendar year.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule")]
pub enum HolidayRule {
    /// Same calendar date every year.
    #[serde(rename = "fixed")]
    Fixed { month: u32, day: u32 },

    /// `n`-th (1-based) weekday of the month.
    #[serde(rename = "nth")]
    NthWeekday {
        month: u32,

        #[serde(with = "weekday_index")]
        weekday: Weekday,

        n: u32,
    },

    /// Last weekday of the month.
    #[serde(rename = "last")]
    LastWeekday {
        month: u32,

        #[serde(with = "weekday_index")]
        weekday: Weekday,
    },
}

impl HolidayRule {
    #[must_use]
    pub fn resolve(self, year: i32) -> Option<NaiveDate> {
        match self {
            Self::Fixed { month, day } => resolve_fixed(year, month, day),
            Self::NthWeekday { month, weekday, n } => resolve_nth_weekday(year, month, weekday, n),
            Self::LastWeekday { month, weekday } => resolve_last_weekday(year, month, weekday),
        }
    }

    #[must_use]
    pub const fn month(self) -> u32 {
        match self {
            Self::Fixed { month, .. }
            | Self::NthWeekday { month, .. }
            | Self::LastWeekday { month, .. } => month,
        }
    }
}

/// Ad-hoc holiday from the configuration.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct CustomHoliday {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(flatten)]
    pub rule: HolidayRule,
}

/// Weekday as its index: `0` for Monday through `6` for Sunday.
mod weekday_index {
    use chrono::Weekday;
    use serde::{Deserialize, Deserializer, Serializer, de};

    #[expect(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(weekday: &Weekday, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(weekday.num_days_from_monday())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Weekday, D::Error> {
        let index = u8::deserialize(deserializer)?;
        Weekday::try_from(index).map_err(|_| {
            de::Error::invalid_value(
                de::Unexpected::Unsigned(index.into()),
                &"a weekday index from 0 (Monday) to 6 (Sunday)",
            )
        })
    }
}
