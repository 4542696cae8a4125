use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnError, DisplayFromStr, PickFirst, serde_as};

use crate::{meter::unit::SensorMode, prelude::*, quantity::cost::Cost};

/// Persisted accumulator state.
///
/// Invalid or missing fields fall back to their defaults, so that a damaged state
/// never prevents the meter from starting.
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccumulatorSnapshot {
    /// Rounded to four decimal places; numeric strings are accepted too.
    #[serde_as(deserialize_as = "DefaultOnError<PickFirst<(_, DisplayFromStr)>>")]
    pub accumulated_cost: Cost,

    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reading: Option<f64>,

    #[serde_as(deserialize_as = "DefaultOnError")]
    pub sensor_mode: SensorMode,

    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reset: Option<NaiveDate>,
}

#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeterSnapshot {
    /// Timestamp of the last processed reading, later readings only are accepted.
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reading_at: Option<DateTime<Utc>>,

    pub day: AccumulatorSnapshot,
    pub week: AccumulatorSnapshot,
    pub month: AccumulatorSnapshot,
}

impl MeterSnapshot {
    /// Read the snapshot, returning the default one when the file does not exist.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn read_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("no saved state yet");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read `{}`", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("failed to parse `{}`", path.display()))
    }

    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result {
        let path: PathBuf = path.as_ref().into();
        std::fs::write(&path, toml::to_string_pretty(self)?)
            .with_context(|| format!("failed to write `{}`", path.display()))?;
        debug!("saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("solarseed-tou-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_deserialize_damaged_snapshot() -> Result {
        // language=JSON
        const SNAPSHOT: &str = r#"{
            "accumulated_cost": "3.1416",
            "last_reading": "garbage",
            "sensor_mode": "solar",
            "last_reset": "2025-10-01"
        }"#;
        let snapshot: AccumulatorSnapshot = serde_json::from_str(SNAPSHOT)?;
        assert_abs_diff_eq!(snapshot.accumulated_cost.into_inner(), 3.1416);
        assert_eq!(snapshot.last_reading, None);
        assert_eq!(snapshot.sensor_mode, SensorMode::Energy);
        assert_eq!(snapshot.last_reset, NaiveDate::from_ymd_opt(2025, 10, 1));
        Ok(())
    }

    #[test]
    fn test_deserialize_empty_snapshot() -> Result {
        let snapshot: MeterSnapshot =
            toml::from_str("last_reading_at = 42\n[day]\naccumulated_cost = 1.5\n")?;
        assert_abs_diff_eq!(snapshot.day.accumulated_cost.into_inner(), 1.5);
        assert_eq!(snapshot.last_reading_at, None);
        assert_eq!(snapshot.week, AccumulatorSnapshot::default());
        Ok(())
    }

    #[test]
    fn test_write_read() -> Result {
        let path = temp_path("snapshot.toml");
        let snapshot = MeterSnapshot {
            last_reading_at: DateTime::from_timestamp(1_760_000_000, 0),
            month: AccumulatorSnapshot {
                accumulated_cost: Cost::from(42.125),
                last_reading: Some(1000.5),
                sensor_mode: SensorMode::Power,
                last_reset: NaiveDate::from_ymd_opt(2025, 10, 1),
            },
            ..MeterSnapshot::default()
        };
        snapshot.write_to(&path)?;
        assert_eq!(MeterSnapshot::read_from(&path)?, snapshot);
        std::fs::remove_file(&path)?;
        Ok(())
    }

    #[test]
    fn test_read_missing() -> Result {
        let snapshot = MeterSnapshot::read_from("/nonexistent/solarseed-tou.toml")?;
        assert_eq!(snapshot, MeterSnapshot::default());
        Ok(())
    }
}
