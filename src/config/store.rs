use std::{
    fs,
    path::{Path, PathBuf},
};

use serde_json::Value;

use crate::{config::ScheduleConfig, prelude::*, schedule::Schedule};

/// Configuration file: JSON for `.json`, TOML otherwise.
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_json(&self) -> bool {
        self.path.extension().is_some_and(|extension| extension.eq_ignore_ascii_case("json"))
    }

    /// Load the configuration, falling back to the defaults when the file does not exist.
    #[instrument(skip_all, fields(path = %self.path.display()))]
    pub fn load(&self) -> Result<ScheduleConfig> {
        if !self.path.is_file() {
            debug!("no stored configuration found, using defaults");
            return Ok(ScheduleConfig::new_default(""));
        }
        let contents = fs::read_to_string(&self.path).context("failed to read the configuration")?;
        let config = if self.is_json() {
            serde_json::from_str(&contents).context("failed to parse the JSON configuration")?
        } else {
            toml::from_str(&contents).context("failed to parse the TOML configuration")?
        };
        Ok(config)
    }

    #[instrument(skip_all, fields(path = %self.path.display()))]
    pub fn save(&self, config: &ScheduleConfig) -> Result {
        let contents = if self.is_json() {
            serde_json::to_string_pretty(config)?
        } else {
            toml::to_string(config)?
        };
        fs::write(&self.path, contents).context("failed to write the configuration")?;
        info!("saved");
        Ok(())
    }

    /// Merge the top-level keys of `updates` into the stored configuration.
    ///
    /// The merged configuration is parsed into a [`Schedule`] before it gets saved,
    /// an invalid result is never persisted.
    #[instrument(skip_all, fields(path = %self.path.display()))]
    pub fn update(&self, updates: Value) -> Result<Schedule> {
        let Value::Object(updates) = updates else {
            bail!("configuration updates must be an object");
        };
        let mut merged = serde_json::to_value(self.load()?)?;
        if let Value::Object(merged) = &mut merged {
            merged.extend(updates);
        }
        let config: ScheduleConfig =
            serde_json::from_value(merged).context("failed to parse the merged configuration")?;
        let schedule = Schedule::from_config(config.clone())?;
        self.save(&config)?;
        Ok(schedule)
    }
}
