//! Configuration blob as it is persisted and imported.
//!
//! Parsing is permissive regarding missing fields, which take the same defaults as before.
//! Semantic problems are collected by [`ScheduleConfig::validate`] and reported together.

mod error;
mod store;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

pub use self::{
    error::{InvalidConfig, Problem},
    store::ConfigStore,
};
use crate::{
    holiday::{CustomHoliday, HolidayRule, StandardHoliday},
    schedule::{DayKey, TierId},
};

#[serde_as]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Entity ID of the metered source sensor.
    #[serde(default)]
    pub energy_sensor: String,

    /// Rate tiers in the declared order.
    #[serde_as(as = "serde_with::Map<_, _>")]
    #[serde(default)]
    pub tiers: Vec<(TierId, TierConfig)>,

    /// Seasons in the declared order, the first matching season wins.
    #[serde_as(as = "serde_with::Map<_, _>")]
    #[serde(default)]
    pub seasons: Vec<(String, SeasonConfig)>,

    #[serde(default)]
    pub holidays: HolidayConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TierConfig {
    /// Defaults to the tier ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub rate: f64,

    #[serde(default = "TierConfig::default_color")]
    pub color: String,
}

impl TierConfig {
    pub const DEFAULT_COLOR: &'static str = "#888888";

    fn default_color() -> String {
        Self::DEFAULT_COLOR.to_owned()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeasonConfig {
    /// Defaults to the season key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub months: Vec<u32>,

    /// Tier IDs by hour, for each day of the week.
    #[serde(default)]
    pub grid: BTreeMap<DayKey, Vec<TierId>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HolidayConfig {
    /// Tier forced on holidays. Defaults to the first declared tier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_tier: Option<TierId>,

    #[serde(default = "HolidayConfig::default_observe_nearest_weekday")]
    pub observe_nearest_weekday: bool,

    /// Standard holiday IDs, unknown IDs are ignored.
    #[serde(default)]
    pub standard: Vec<String>,

    #[serde(default)]
    pub custom: Vec<CustomHoliday>,
}

impl HolidayConfig {
    const fn default_observe_nearest_weekday() -> bool {
        true
    }
}

impl Default for HolidayConfig {
    fn default() -> Self {
        Self {
            rate_tier: None,
            observe_nearest_weekday: true,
            standard: Vec::new(),
            custom: Vec::new(),
        }
    }
}

impl ScheduleConfig {
    /// Default configuration for a new installation.
    #[must_use]
    pub fn new_default(energy_sensor: impl Into<String>) -> Self {
        let off_peak = TierId::from(TierId::OFF_PEAK);
        let on_peak = TierId::from("on-peak");
        let grid = DayKey::ALL.into_iter().map(|day| (day, vec![off_peak.clone(); 24])).collect();
        Self {
            energy_sensor: energy_sensor.into(),
            tiers: vec![
                (
                    off_peak.clone(),
                    TierConfig {
                        name: Some("Off-Peak".to_owned()),
                        rate: 0.10,
                        color: "#22c55e".to_owned(),
                    },
                ),
                (
                    on_peak,
                    TierConfig {
                        name: Some("On-Peak".to_owned()),
                        rate: 0.18,
                        color: "#ef4444".to_owned(),
                    },
                ),
            ],
            seasons: vec![(
                "all_year".to_owned(),
                SeasonConfig {
                    name: Some("All Year".to_owned()),
                    months: (1..=12).collect(),
                    grid,
                },
            )],
            holidays: HolidayConfig {
                rate_tier: Some(off_peak),
                observe_nearest_weekday: true,
                standard: [
                    StandardHoliday::NewYears,
                    StandardHoliday::Memorial,
                    StandardHoliday::Independence,
                    StandardHoliday::Labor,
                    StandardHoliday::Thanksgiving,
                    StandardHoliday::Christmas,
                ]
                .into_iter()
                .map(|holiday| holiday.id().to_owned())
                .collect(),
                custom: Vec::new(),
            },
        }
    }

    /// Check the configuration and collect all the problems at once.
    pub fn validate(&self) -> Result<(), InvalidConfig> {
        let mut problems = Vec::new();

        for (index, (id, tier)) in self.tiers.iter().enumerate() {
            if id.as_str().is_empty() {
                problems.push(Problem::EmptyTierId);
            }
            if self.tiers[..index].iter().any(|(other_id, _)| other_id == id) {
                problems.push(Problem::DuplicateTier(id.clone()));
            }
            if !tier.rate.is_finite() || tier.rate < 0.0 {
                problems.push(Problem::InvalidRate { tier: id.clone(), rate: tier.rate });
            }
        }

        for (key, season) in &self.seasons {
            for &month in &season.months {
                if !(1..=12).contains(&month) {
                    problems.push(Problem::InvalidSeasonMonth { season: key.clone(), month });
                }
            }
        }

        for (index, holiday) in self.holidays.custom.iter().enumerate() {
            let month = holiday.rule.month();
            if !(1..=12).contains(&month) {
                problems.push(Problem::InvalidHolidayMonth { index, month });
                continue;
            }
            match holiday.rule {
                // Year 2000 is a leap year, so 29th of February is accepted.
                HolidayRule::Fixed { day, .. }
                    if NaiveDate::from_ymd_opt(2000, month, day).is_none() =>
                {
                    problems.push(Problem::InvalidHolidayDay { index, month, day });
                }
                HolidayRule::NthWeekday { n, .. } if !(1..=5).contains(&n) => {
                    problems.push(Problem::InvalidOccurrence { index, n });
                }
                _ => {}
            }
        }

        if problems.is_empty() { Ok(()) } else { Err(InvalidConfig(problems)) }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Weekday;

    use super::*;
    use crate::prelude::*;

    #[test]
    fn test_default_is_valid() {
        assert!(ScheduleConfig::new_default("sensor.energy").validate().is_ok());
    }

    #[test]
    fn test_deserialize_keeps_declared_order() -> Result {
        // language=JSON
        const CONFIG: &str = r##"
            {
                "tiers": {
                    "super-off-peak": {"name": "Super Off-Peak", "rate": 0.05},
                    "mid-peak": {"rate": 0.12, "color": "#ffaa00"},
                    "another": {}
                }
            }
        "##;
        let config = serde_json::from_str::<ScheduleConfig>(CONFIG)?;
        let ids = config.tiers.iter().map(|(id, _)| id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, ["super-off-peak", "mid-peak", "another"]);
        assert_eq!(config.tiers[1].1.name, None);
        assert_eq!(config.tiers[2].1.color, TierConfig::DEFAULT_COLOR);
        assert_eq!(config.energy_sensor, "");
        assert!(config.holidays.observe_nearest_weekday);
        assert_eq!(config.holidays.rate_tier, None);
        Ok(())
    }

    #[test]
    fn test_validate_collects_all_problems() {
        let mut config = ScheduleConfig::new_default("");
        config.tiers[0].1.rate = -0.01;
        config.tiers.push((TierId::from(""), TierConfig {
            name: None,
            rate: 0.0,
            color: TierConfig::DEFAULT_COLOR.to_owned(),
        }));
        config.seasons[0].1.months.push(13);
        config.holidays.custom = vec![
            CustomHoliday { name: None, rule: HolidayRule::Fixed { month: 2, day: 30 } },
            CustomHoliday {
                name: None,
                rule: HolidayRule::NthWeekday { month: 3, weekday: Weekday::Mon, n: 0 },
            },
            CustomHoliday {
                name: None,
                rule: HolidayRule::LastWeekday { month: 0, weekday: Weekday::Mon },
            },
            CustomHoliday { name: None, rule: HolidayRule::Fixed { month: 2, day: 29 } },
        ];

        let error = config.validate().unwrap_err();
        assert_eq!(error.0.len(), 6, "{error}");
        assert!(matches!(error.0[0], Problem::InvalidRate { .. }));
        assert!(matches!(error.0[1], Problem::EmptyTierId));
        assert!(matches!(error.0[2], Problem::InvalidSeasonMonth { month: 13, .. }));
        assert!(matches!(error.0[3], Problem::InvalidHolidayDay { index: 0, .. }));
        assert!(matches!(error.0[4], Problem::InvalidOccurrence { index: 1, n: 0 }));
        assert!(matches!(error.0[5], Problem::InvalidHolidayMonth { index: 2, month: 0 }));
    }

    #[test]
    fn test_validate_duplicate_tier() -> Result {
        // language=JSON
        const CONFIG: &str = r#"{"tiers": {"a": {"rate": 0.1}, "a": {"rate": 0.2}}}"#;
        let config = serde_json::from_str::<ScheduleConfig>(CONFIG)?;
        let error = config.validate().unwrap_err();
        assert!(matches!(&error.0[..], [Problem::DuplicateTier(id)] if id.as_str() == "a"));
        Ok(())
    }
}
