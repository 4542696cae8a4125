use serde::{Deserialize, Serialize};

/// What the source sensor measures.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorMode {
    /// Cumulative energy meter, normalized to kilowatt-hours.
    #[default]
    Energy,

    /// Instantaneous power, normalized to kilowatts.
    Power,
}

/// Sensor mode and the multiplier which normalizes raw values to kWh or kW.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct UnitScale {
    pub mode: SensorMode,
    pub multiplier: f64,
}

impl UnitScale {
    const fn power(multiplier: f64) -> Self {
        Self { mode: SensorMode::Power, multiplier }
    }

    const fn energy(multiplier: f64) -> Self {
        Self { mode: SensorMode::Energy, multiplier }
    }

    /// Detect the scale from the unit of measurement.
    ///
    /// Unknown units are treated as kilowatt-hours, unless the device class says it is
    /// a power sensor, in which case watts are assumed.
    #[must_use]
    pub fn detect(unit: Option<&str>, device_class: Option<&str>) -> Self {
        match unit {
            Some("W") => Self::power(0.001),
            Some("kW") => Self::power(1.0),
            Some("mW") => Self::power(0.000_001),
            Some("Wh") => Self::energy(0.001),
            Some("kWh") => Self::energy(1.0),
            Some("MWh") => Self::energy(1000.0),
            _ if device_class == Some("power") => Self::power(0.001),
            _ => Self::energy(1.0),
        }
    }
}

impl Default for UnitScale {
    fn default() -> Self {
        Self::energy(1.0)
    }
}
