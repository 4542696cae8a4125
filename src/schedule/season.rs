use std::collections::BTreeMap;

use chrono::Weekday;

use crate::schedule::{DayKey, TierId};

/// Set of months sharing one weekly rate grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Season {
    /// Key under which the season is stored in the configuration.
    pub key: String,

    pub name: String,
    pub months: Vec<u32>,
    pub grid: BTreeMap<DayKey, Vec<TierId>>,
}

impl Season {
    #[must_use]
    pub fn contains_month(&self, month: u32) -> bool {
        self.months.contains(&month)
    }

    /// Grid cell for the weekday and hour, if the grid has one.
    #[must_use]
    pub fn tier_at(&self, weekday: Weekday, hour: u32) -> Option<&TierId> {
        self.grid.get(&DayKey::from(weekday))?.get(usize::try_from(hour).ok()?)
    }
}
