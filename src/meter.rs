//! Running cost of the consumed energy over the day, the week and the month.

mod accumulator;
mod period;
mod reading;
mod snapshot;
mod unit;

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

pub use self::{
    accumulator::{AccumulatorState, CostAccumulator},
    period::ResetPeriod,
    reading::{Reading, SensorEvent},
    snapshot::{AccumulatorSnapshot, MeterSnapshot},
    unit::{SensorMode, UnitScale},
};
use crate::{prelude::*, schedule::Schedule};

/// Cost accumulators for every reset period, sharing the same schedule.
#[derive(Debug)]
pub struct Meter {
    schedule: Arc<Schedule>,
    day: CostAccumulator,
    week: CostAccumulator,
    month: CostAccumulator,

    last_reading_at: Option<DateTime<Utc>>,
}

impl Meter {
    pub fn new(schedule: Arc<Schedule>) -> Self {
        Self {
            day: CostAccumulator::new(ResetPeriod::Day, schedule.clone()),
            week: CostAccumulator::new(ResetPeriod::Week, schedule.clone()),
            month: CostAccumulator::new(ResetPeriod::Month, schedule.clone()),
            schedule,
            last_reading_at: None,
        }
    }

    #[must_use]
    pub const fn schedule(&self) -> &Arc<Schedule> {
        &self.schedule
    }

    /// Swap the schedule for all the accumulators at once.
    #[instrument(skip_all)]
    pub fn replace_schedule(&mut self, schedule: Arc<Schedule>) {
        info!(n_tiers = schedule.tiers().len(), "replacing the schedule");
        for accumulator in self.accumulators_mut() {
            accumulator.replace_schedule(schedule.clone());
        }
        self.schedule = schedule;
    }

    /// Timestamp of the last accepted reading.
    #[must_use]
    pub const fn last_reading_at(&self) -> Option<DateTime<Utc>> {
        self.last_reading_at
    }

    #[must_use]
    pub const fn accumulator(&self, period: ResetPeriod) -> &CostAccumulator {
        match period {
            ResetPeriod::Day => &self.day,
            ResetPeriod::Week => &self.week,
            ResetPeriod::Month => &self.month,
        }
    }

    pub fn accumulators(&self) -> impl Iterator<Item = &CostAccumulator> {
        [&self.day, &self.week, &self.month].into_iter()
    }

    fn accumulators_mut(&mut self) -> impl Iterator<Item = &mut CostAccumulator> {
        [&mut self.day, &mut self.week, &mut self.month].into_iter()
    }

    pub fn on_event<Tz: TimeZone>(&mut self, event: &SensorEvent<Tz>) {
        match event {
            SensorEvent::Reading(reading) => {
                let timestamp = reading.timestamp.with_timezone(&Utc);
                if self.last_reading_at.is_some_and(|last_reading_at| timestamp <= last_reading_at)
                {
                    debug!(%timestamp, "skipping the already processed reading");
                    return;
                }
                self.last_reading_at = Some(timestamp);
                for accumulator in self.accumulators_mut() {
                    accumulator.on_reading(reading);
                }
            }
            SensorEvent::Unavailable => {
                debug!("source unavailable");
                for accumulator in self.accumulators_mut() {
                    accumulator.on_source_unavailable();
                }
            }
        }
    }

    /// Periodic reset check, independent of the readings.
    pub fn check_reset(&mut self, today: NaiveDate) {
        for accumulator in self.accumulators_mut() {
            accumulator.check_reset(today);
        }
    }

    pub fn restore(&mut self, snapshot: MeterSnapshot, today: NaiveDate) {
        self.last_reading_at = snapshot.last_reading_at;
        self.day.restore(snapshot.day, today);
        self.week.restore(snapshot.week, today);
        self.month.restore(snapshot.month, today);
    }

    #[must_use]
    pub fn snapshot(&self) -> MeterSnapshot {
        MeterSnapshot {
            last_reading_at: self.last_reading_at,
            day: self.day.snapshot(),
            week: self.week.snapshot(),
            month: self.month.snapshot(),
        }
    }
}
