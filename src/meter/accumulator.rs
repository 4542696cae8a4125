use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeDelta, TimeZone, Utc};

use crate::{
    meter::{
        period::ResetPeriod,
        reading::Reading,
        snapshot::AccumulatorSnapshot,
        unit::{SensorMode, UnitScale},
    },
    prelude::*,
    quantity::{cost::Cost, energy::KilowattHours, power::Kilowatts},
    schedule::Schedule,
};

/// Longest gap between power readings which is still integrated.
const MAX_POWER_GAP: TimeDelta = TimeDelta::hours(1);

#[derive(Clone, Debug, PartialEq)]
pub struct AccumulatorState {
    pub accumulated_cost: Cost,

    /// Normalized energy in kWh for energy sensors, raw power for power sensors.
    pub last_reading: Option<f64>,

    pub last_power_timestamp: Option<DateTime<Utc>>,

    /// Boundary date of the current period.
    pub last_reset: Option<NaiveDate>,

    pub sensor_mode: SensorMode,
    pub unit_multiplier: f64,
}

impl Default for AccumulatorState {
    fn default() -> Self {
        Self {
            accumulated_cost: Cost::ZERO,
            last_reading: None,
            last_power_timestamp: None,
            last_reset: None,
            sensor_mode: SensorMode::default(),
            unit_multiplier: 1.0,
        }
    }
}

/// Running cost of the consumed energy over a reset period.
#[derive(Debug)]
pub struct CostAccumulator {
    period: ResetPeriod,
    schedule: Arc<Schedule>,
    state: AccumulatorState,
}

impl CostAccumulator {
    pub fn new(period: ResetPeriod, schedule: Arc<Schedule>) -> Self {
        Self { period, schedule, state: AccumulatorState::default() }
    }

    #[must_use]
    pub const fn period(&self) -> ResetPeriod {
        self.period
    }

    #[must_use]
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    #[must_use]
    pub const fn state(&self) -> &AccumulatorState {
        &self.state
    }

    pub const fn accumulated_cost(&self) -> Cost {
        self.state.accumulated_cost
    }

    /// Swap the schedule used for the subsequent readings.
    ///
    /// The accumulated cost and the last reading are kept.
    pub fn replace_schedule(&mut self, schedule: Arc<Schedule>) {
        self.schedule = schedule;
    }

    pub fn on_reading<Tz: TimeZone>(&mut self, reading: &Reading<Tz>) {
        if !reading.value.is_finite() {
            debug!(value = reading.value, "skipping non-finite reading");
            return;
        }
        let scale = UnitScale::detect(reading.unit.as_deref(), reading.device_class.as_deref());
        self.switch_mode(scale);

        let local = reading.timestamp.naive_local();
        self.check_reset(local.date());
        let rate = self.schedule.get_rate(local);

        match scale.mode {
            SensorMode::Energy => {
                let energy = KilowattHours::from(reading.value * scale.multiplier);
                if let Some(last_reading) = self.state.last_reading {
                    let delta = energy - KilowattHours::from(last_reading);
                    // Negative deltas are meter resets or rollovers.
                    if delta.is_positive() {
                        self.add(delta * rate);
                    }
                }
                self.state.last_reading = Some(energy.into_inner());
            }
            SensorMode::Power => {
                let timestamp = reading.timestamp.with_timezone(&Utc);
                if let Some(last_timestamp) = self.state.last_power_timestamp {
                    let time_delta = timestamp - last_timestamp;
                    if time_delta > TimeDelta::zero() && time_delta <= MAX_POWER_GAP {
                        let power = Kilowatts::from(reading.value * scale.multiplier);
                        let cost = power * time_delta * rate;
                        // Exported power is not credited.
                        if cost.is_positive() {
                            self.add(cost);
                        }
                    } else if time_delta > MAX_POWER_GAP {
                        debug!(%time_delta, "skipping the gap between power readings");
                    }
                }
                self.state.last_power_timestamp = Some(timestamp);
                self.state.last_reading = Some(reading.value);
            }
        }
    }

    /// The source became unavailable: a power sensor must not integrate over the outage.
    pub fn on_source_unavailable(&mut self) {
        if matches!(self.state.sensor_mode, SensorMode::Power) {
            self.state.last_power_timestamp = None;
        }
    }

    /// Reset the accumulated cost if the period containing `today` has not been seen yet.
    pub fn check_reset(&mut self, today: NaiveDate) -> bool {
        let boundary = self.period.boundary(today);
        if self.period.is_crossed(self.state.last_reset, boundary) {
            info!(
                period = ?self.period,
                %boundary,
                cost = ?self.state.accumulated_cost,
                "resetting",
            );
            self.state.accumulated_cost = Cost::ZERO;
            self.state.last_reset = Some(boundary);
            true
        } else {
            false
        }
    }

    /// Seed the state from a persisted snapshot and reset if the period has passed since.
    pub fn restore(&mut self, snapshot: AccumulatorSnapshot, today: NaiveDate) {
        let cost = snapshot.accumulated_cost;
        self.state = AccumulatorState {
            accumulated_cost: if cost.into_inner().is_finite() && cost.is_positive() {
                cost
            } else {
                Cost::ZERO
            },
            last_reading: snapshot.last_reading.filter(|value| value.is_finite()),
            last_power_timestamp: None,
            last_reset: snapshot.last_reset,
            sensor_mode: snapshot.sensor_mode,
            unit_multiplier: 1.0,
        };
        debug!(period = ?self.period, state = ?self.state, "restored");
        self.check_reset(today);
    }

    #[must_use]
    pub fn snapshot(&self) -> AccumulatorSnapshot {
        AccumulatorSnapshot {
            accumulated_cost: self.state.accumulated_cost.round_to_reported(),
            last_reading: self.state.last_reading,
            sensor_mode: self.state.sensor_mode,
            last_reset: self.state.last_reset,
        }
    }

    fn switch_mode(&mut self, scale: UnitScale) {
        if self.state.sensor_mode != scale.mode {
            info!(from = ?self.state.sensor_mode, to = ?scale.mode, "switching the sensor mode");
            self.state.sensor_mode = scale.mode;
            self.state.last_reading = None;
            self.state.last_power_timestamp = None;
        }
        self.state.unit_multiplier = scale.multiplier;
    }

    fn add(&mut self, cost: Cost) {
        trace!(period = ?self.period, ?cost, "accumulating");
        self.state.accumulated_cost += cost;
    }
}
