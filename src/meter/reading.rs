use chrono::{DateTime, TimeZone};

use crate::prelude::*;

/// Single numeric reading of the source sensor.
///
/// The time zone of the timestamp defines the wall clock used for the rate lookup.
#[derive(Clone, Debug, bon::Builder)]
pub struct Reading<Tz: TimeZone> {
    /// Raw value in the source unit.
    pub value: f64,

    /// Unit of measurement, for example, `kWh` or `W`.
    #[builder(into)]
    pub unit: Option<String>,

    /// Device class hint, for example, `energy` or `power`.
    #[builder(into)]
    pub device_class: Option<String>,

    pub timestamp: DateTime<Tz>,
}

/// Host event about the source sensor.
#[derive(Clone, Debug)]
pub enum SensorEvent<Tz: TimeZone> {
    Reading(Reading<Tz>),

    /// The source is unavailable or its state is unknown.
    Unavailable,
}

impl<Tz: TimeZone> SensorEvent<Tz> {
    /// Interpret a raw sensor state.
    ///
    /// Returns [`None`] for states which must be skipped, such as non-numeric values.
    pub fn from_state(
        state: &str,
        unit: Option<&str>,
        device_class: Option<&str>,
        timestamp: DateTime<Tz>,
    ) -> Option<Self> {
        match state {
            "unavailable" | "unknown" => Some(Self::Unavailable),
            _ => match state.trim().parse::<f64>() {
                Ok(value) if value.is_finite() => Some(Self::Reading(Reading {
                    value,
                    unit: unit.map(str::to_owned),
                    device_class: device_class.map(str::to_owned),
                    timestamp,
                })),
                _ => {
                    debug!(state, "skipping non-numeric state");
                    None
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn test_from_state() {
        let now = Utc::now();
        assert!(matches!(
            SensorEvent::from_state("unavailable", None, None, now),
            Some(SensorEvent::Unavailable),
        ));
        assert!(matches!(
            SensorEvent::from_state("unknown", None, None, now),
            Some(SensorEvent::Unavailable),
        ));
        assert!(SensorEvent::from_state("n/a", None, None, now).is_none());
        assert!(SensorEvent::from_state("NaN", None, None, now).is_none());
        match SensorEvent::from_state("39775.108", Some("kWh"), Some("energy"), now) {
            Some(SensorEvent::Reading(reading)) => {
                assert!((reading.value - 39775.108).abs() < f64::EPSILON);
                assert_eq!(reading.unit.as_deref(), Some("kWh"));
                assert_eq!(reading.device_class.as_deref(), Some("energy"));
            }
            _ => panic!("expected a reading"),
        }
    }
}
