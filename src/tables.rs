use chrono::{NaiveDate, NaiveTime, TimeDelta};
use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{
    meter::Meter,
    schedule::{RateStatus, Schedule},
};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table
}

/// Parse the `#rrggbb` tier color.
fn parse_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |index: usize| u8::from_str_radix(hex.get(index..index + 2)?, 16).ok();
    Some(Color::Rgb { r: channel(0)?, g: channel(2)?, b: channel(4)? })
}

/// Tier and rate for each hour of the date.
pub fn build_day_table(schedule: &Schedule, date: NaiveDate) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Start", "End", "Tier", "Rate"]);
    for hour in 0..24 {
        let start = date.and_time(NaiveTime::MIN) + TimeDelta::hours(hour);
        let tier_id = schedule.get_tier_id(start);
        let (name, color) = schedule
            .tier(tier_id)
            .map_or((tier_id.as_str(), None), |tier| {
                (tier.name.as_str(), parse_color(&tier.color))
            });
        let mut tier_cell = Cell::new(name);
        if let Some(color) = color {
            tier_cell = tier_cell.fg(color);
        }
        table.add_row(vec![
            Cell::new(start.format("%H:%M")),
            Cell::new((start + TimeDelta::hours(1)).format("%H:%M")).add_attribute(Attribute::Dim),
            tier_cell,
            Cell::new(schedule.get_rate(start)).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

pub fn build_status_table(status: &RateStatus<'_>) -> Table {
    let mut table = new_table();
    table.set_header(vec!["At", "Tier", "Rate", "Holiday", "Next change", "Next tier"]);
    table.add_row(vec![
        Cell::new(status.at.format("%b %d %H:%M")),
        Cell::new(status.tier_name()),
        Cell::new(status.rate).set_alignment(CellAlignment::Right),
        Cell::new(if status.is_holiday { "yes" } else { "no" }).fg(if status.is_holiday {
            Color::DarkYellow
        } else {
            Color::Reset
        }),
        status.next_change.map_or_else(
            || Cell::new("none").add_attribute(Attribute::Dim),
            |(at, _)| Cell::new(at.format("%b %d %H:%M")),
        ),
        Cell::new(status.next_tier_name().unwrap_or_default()),
    ]);
    table
}

/// Resolved holiday dates of the year.
pub fn build_holidays_table(schedule: &Schedule, year: i32) -> Table {
    let holidays = schedule.holidays();
    let mut table = new_table();
    table.set_header(vec!["Date", "Weekday", "Holiday"]);
    for date in holidays.resolve(year) {
        let is_observed_on = |rule_date: Option<NaiveDate>| {
            rule_date.is_some_and(|rule_date| {
                observed(rule_date, holidays.observe_nearest_weekday) == date
            })
        };
        let mut names: Vec<String> = holidays
            .standard
            .iter()
            .filter(|holiday| is_observed_on(holiday.rule().resolve(year)))
            .map(|holiday| holiday.name().to_owned())
            .collect();
        names.extend(
            holidays
                .custom
                .iter()
                .filter(|holiday| is_observed_on(holiday.rule.resolve(year)))
                .map(|holiday| holiday.name.clone().unwrap_or_else(|| "Custom".to_owned())),
        );
        table.add_row(vec![
            Cell::new(date.format("%Y-%m-%d")),
            Cell::new(date.format("%A")).add_attribute(Attribute::Dim),
            Cell::new(names.join(", ")),
        ]);
    }
    table
}

fn observed(date: NaiveDate, observe_nearest_weekday: bool) -> NaiveDate {
    if observe_nearest_weekday { crate::holiday::observe_nearest_weekday(date) } else { date }
}

pub fn build_meter_table(meter: &Meter) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Period", "Since", "Mode", "Cost"]);
    for accumulator in meter.accumulators() {
        let state = accumulator.state();
        table.add_row(vec![
            Cell::new(accumulator.period().title()),
            Cell::new(state.last_reset.map_or_else(String::new, |date| date.to_string()))
                .add_attribute(Attribute::Dim),
            Cell::new(format!("{:?}", state.sensor_mode)),
            Cell::new(state.accumulated_cost.round_to_reported())
                .set_alignment(CellAlignment::Right)
                .add_attribute(Attribute::Bold),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::ScheduleConfig, prelude::*};

    #[test]
    fn test_parse_color() {
        assert!(matches!(parse_color("#ef4444"), Some(Color::Rgb { r: 0xEF, g: 0x44, b: 0x44 })));
        assert!(parse_color("ef4444").is_none());
        assert!(parse_color("#fff").is_none());
        assert!(parse_color("#zzzzzz").is_none());
    }

    #[test]
    fn test_build_holidays_table() -> Result {
        let schedule = Schedule::from_config(ScheduleConfig::new_default("sensor.energy"))?;
        let table = build_holidays_table(&schedule, 2026);
        assert_eq!(table.row_count(), 6);
        // July 4, 2026 is a Saturday, observed on Friday.
        assert!(table.to_string().contains("2026-07-03"));
        Ok(())
    }

    #[test]
    fn test_build_day_table() -> Result {
        let schedule = Schedule::from_config(ScheduleConfig::new_default("sensor.energy"))?;
        let table = build_day_table(&schedule, NaiveDate::from_ymd_opt(2025, 10, 15).unwrap());
        assert_eq!(table.row_count(), 24);
        Ok(())
    }
}
