//! Rate schedule resolution.
//!
//! The active tier for an instant is resolved by:
//!
//! 1. Checking whether the date is a holiday, in which case the holiday tier applies.
//! 2. Finding the season by the month.
//! 3. Looking up the weekday row in the season grid.
//! 4. Indexing the row by the hour.
//!
//! Missing seasons, rows and cells fall back to the first declared tier.

mod day;
mod season;
mod status;
mod tier;

use std::{
    collections::BTreeSet,
    sync::{Mutex, PoisonError},
};

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use enumset::EnumSet;

pub use self::{
    day::DayKey,
    season::Season,
    status::RateStatus,
    tier::{RateTier, TierId},
};
use crate::{
    config::{HolidayConfig, InvalidConfig, ScheduleConfig, SeasonConfig, TierConfig},
    holiday::{CustomHoliday, StandardHoliday, resolve_holidays_for_year},
    prelude::*,
    quantity::rate::KilowattHourRate,
};

/// Holiday overrides.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Holidays {
    /// Tier forced on holiday dates.
    pub rate_tier: TierId,

    pub observe_nearest_weekday: bool,
    pub standard: EnumSet<StandardHoliday>,
    pub custom: Vec<CustomHoliday>,
}

impl Holidays {
    #[must_use]
    pub fn resolve(&self, year: i32) -> BTreeSet<NaiveDate> {
        resolve_holidays_for_year(self.standard, &self.custom, year, self.observe_nearest_weekday)
    }
}

/// Holiday dates resolved for a single year.
#[derive(Debug)]
struct HolidayCache {
    year: i32,
    dates: BTreeSet<NaiveDate>,
}

/// Complete time-of-use schedule.
///
/// Immutable once built: a configuration change builds a new schedule.
#[derive(Debug)]
pub struct Schedule {
    energy_sensor: String,

    /// Tiers in the declared order.
    tiers: Vec<RateTier>,

    /// Seasons in the declared order.
    seasons: Vec<Season>,

    holidays: Holidays,

    /// Tier for the instants not covered by any grid cell: the first declared tier.
    fallback_tier: TierId,

    holiday_cache: Mutex<Option<HolidayCache>>,
}

impl Schedule {
    /// Build the schedule from the configuration blob.
    pub fn from_config(config: ScheduleConfig) -> Result<Self, InvalidConfig> {
        config.validate()?;

        let fallback_tier = config
            .tiers
            .first()
            .map_or_else(|| TierId::from(TierId::OFF_PEAK), |(id, _)| id.clone());

        let tiers: Vec<RateTier> = config
            .tiers
            .into_iter()
            .map(|(id, tier)| RateTier {
                name: tier.name.unwrap_or_else(|| id.to_string()),
                rate: KilowattHourRate::from(tier.rate),
                color: tier.color,
                id,
            })
            .collect();

        let seasons: Vec<Season> = config
            .seasons
            .into_iter()
            .map(|(key, season)| Season {
                name: season.name.unwrap_or_else(|| key.clone()),
                months: season.months,
                grid: season.grid,
                key,
            })
            .collect();

        let standard = config
            .holidays
            .standard
            .iter()
            .filter_map(|id| {
                let holiday = StandardHoliday::from_id(id);
                if holiday.is_none() {
                    debug!(%id, "ignoring unknown standard holiday");
                }
                holiday
            })
            .collect();
        let holidays = Holidays {
            rate_tier: config.holidays.rate_tier.unwrap_or_else(|| fallback_tier.clone()),
            observe_nearest_weekday: config.holidays.observe_nearest_weekday,
            standard,
            custom: config.holidays.custom,
        };

        let this = Self {
            energy_sensor: config.energy_sensor,
            tiers,
            seasons,
            holidays,
            fallback_tier,
            holiday_cache: Mutex::new(None),
        };
        this.warn_about_dangling_references();
        info!(n_tiers = this.tiers.len(), n_seasons = this.seasons.len(), "parsed the schedule");
        Ok(this)
    }

    /// Serialize back into the configuration blob.
    #[must_use]
    pub fn to_config(&self) -> ScheduleConfig {
        ScheduleConfig {
            energy_sensor: self.energy_sensor.clone(),
            tiers: self
                .tiers
                .iter()
                .map(|tier| {
                    let config = TierConfig {
                        name: Some(tier.name.clone()),
                        rate: tier.rate.into_inner(),
                        color: tier.color.clone(),
                    };
                    (tier.id.clone(), config)
                })
                .collect(),
            seasons: self
                .seasons
                .iter()
                .map(|season| {
                    let config = SeasonConfig {
                        name: Some(season.name.clone()),
                        months: season.months.clone(),
                        grid: season.grid.clone(),
                    };
                    (season.key.clone(), config)
                })
                .collect(),
            holidays: HolidayConfig {
                rate_tier: Some(self.holidays.rate_tier.clone()),
                observe_nearest_weekday: self.holidays.observe_nearest_weekday,
                standard: self.holidays.standard.iter().map(|h| h.id().to_owned()).collect(),
                custom: self.holidays.custom.clone(),
            },
        }
    }

    fn warn_about_dangling_references(&self) {
        if self.tier(&self.holidays.rate_tier).is_none() {
            warn!(tier_id = %self.holidays.rate_tier, "the holiday tier is not defined");
        }
        for season in &self.seasons {
            for (day, row) in &season.grid {
                if row.len() != 24 {
                    warn!(season = %season.key, ?day, n_hours = row.len(), "incomplete grid row");
                }
                for tier_id in row.iter().filter(|tier_id| self.tier(tier_id).is_none()) {
                    warn!(season = %season.key, ?day, %tier_id, "the tier is not defined");
                }
            }
        }
    }

    #[must_use]
    pub fn energy_sensor(&self) -> &str {
        &self.energy_sensor
    }

    #[must_use]
    pub fn tiers(&self) -> &[RateTier] {
        &self.tiers
    }

    #[must_use]
    pub fn seasons(&self) -> &[Season] {
        &self.seasons
    }

    #[must_use]
    pub const fn holidays(&self) -> &Holidays {
        &self.holidays
    }

    #[must_use]
    pub const fn fallback_tier(&self) -> &TierId {
        &self.fallback_tier
    }

    #[must_use]
    pub fn tier(&self, id: &TierId) -> Option<&RateTier> {
        self.tiers.iter().find(|tier| &tier.id == id)
    }

    /// Check whether the date is a holiday.
    ///
    /// Holiday dates get resolved once per year and cached until a date from another year
    /// is requested.
    #[must_use]
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        let year = date.year();
        let mut cache = self.holiday_cache.lock().unwrap_or_else(PoisonError::into_inner);
        if cache.as_ref().is_none_or(|cache| cache.year != year) {
            *cache = Some(HolidayCache { year, dates: self.holidays.resolve(year) });
        }
        cache.as_ref().is_some_and(|cache| cache.dates.contains(&date))
    }

    /// Find the first season covering the month.
    ///
    /// Falls back to the first season when no season covers the month.
    #[must_use]
    pub fn get_season(&self, month: u32) -> Option<&Season> {
        self.seasons
            .iter()
            .find(|season| season.contains_month(month))
            .or_else(|| self.seasons.first())
    }

    /// Resolve the active tier ID.
    #[must_use]
    pub fn get_tier_id(&self, at: NaiveDateTime) -> &TierId {
        if self.is_holiday(at.date()) {
            return &self.holidays.rate_tier;
        }
        self.get_season(at.month())
            .and_then(|season| season.tier_at(at.weekday(), at.hour()))
            .unwrap_or(&self.fallback_tier)
    }

    /// Resolve the active tier, if it is defined.
    #[must_use]
    pub fn get_tier(&self, at: NaiveDateTime) -> Option<&RateTier> {
        self.tier(self.get_tier_id(at))
    }

    /// Resolve the active rate, zero for an undefined tier.
    #[must_use]
    pub fn get_rate(&self, at: NaiveDateTime) -> KilowattHourRate {
        self.get_tier(at).map_or(KilowattHourRate::ZERO, |tier| tier.rate)
    }

    /// Find the next hour at which the tier changes.
    ///
    /// Only the rest of the current day and the whole next day are scanned:
    /// a change further away is reported as [`None`].
    #[must_use]
    pub fn get_next_rate_change(&self, at: NaiveDateTime) -> Option<(NaiveDateTime, &TierId)> {
        let current_tier = self.get_tier_id(at);
        let today = at.date();
        let tomorrow = today.succ_opt()?;
        (at.hour() + 1..24)
            .map(|hour| (today, hour))
            .chain((0..24).map(|hour| (tomorrow, hour)))
            .filter_map(|(date, hour)| date.and_hms_opt(hour, 0, 0))
            .map(|check_at| (check_at, self.get_tier_id(check_at)))
            .find(|(_, tier_id)| *tier_id != current_tier)
    }

    /// Snapshot of everything known about the rate at the instant.
    #[must_use]
    pub fn status(&self, at: NaiveDateTime) -> RateStatus<'_> {
        let tier_id = self.get_tier_id(at);
        let next_change = self.get_next_rate_change(at);
        RateStatus {
            at,
            tier_id,
            tier: self.tier(tier_id),
            rate: self.get_rate(at),
            is_holiday: self.is_holiday(at.date()),
            next_tier: next_change.and_then(|(_, tier_id)| self.tier(tier_id)),
            next_change,
        }
    }
}

impl TryFrom<ScheduleConfig> for Schedule {
    type Error = InvalidConfig;

    fn try_from(config: ScheduleConfig) -> Result<Self, Self::Error> {
        Self::from_config(config)
    }
}
