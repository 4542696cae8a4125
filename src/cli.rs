use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    /// Schedule configuration file: JSON for `.json`, TOML otherwise.
    #[clap(long = "config", env = "TOU_CONFIG", default_value = "tou.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write the default configuration.
    #[clap(name = "init")]
    Init(InitArgs),

    /// Validate the configuration and print the problems found.
    #[clap(name = "validate")]
    Validate,

    /// Merge top-level configuration keys from a JSON object and save the result.
    #[clap(name = "update")]
    Update {
        /// For example, `{"energy_sensor": "sensor.grid_import"}`.
        updates: String,
    },

    /// Show the active rate and the next change.
    #[clap(name = "rate")]
    Rate {
        /// Local date and time, for example, `2025-10-15T18:00:00`; defaults to now.
        #[clap(long)]
        at: Option<NaiveDateTime>,
    },

    /// Show the hourly tiers of a day.
    #[clap(name = "day")]
    Day {
        /// Defaults to today.
        date: Option<NaiveDate>,
    },

    /// List the resolved holidays of a year.
    #[clap(name = "holidays")]
    Holidays {
        /// Defaults to the current year.
        year: Option<i32>,
    },

    /// Feed the recorded sensor states through the cost meter.
    #[clap(name = "replay")]
    Replay(Box<ReplayArgs>),
}

#[derive(Parser)]
pub struct InitArgs {
    #[clap(long = "energy-sensor", env = "ENERGY_SENSOR", default_value = "sensor.energy")]
    pub energy_sensor: String,

    /// Overwrite the existing configuration.
    #[clap(long)]
    pub force: bool,
}

#[derive(Parser)]
pub struct ReplayArgs {
    /// History exported from `/api/history/period`; the live API is queried if omitted.
    #[clap(long = "history-file")]
    pub history_file: Option<PathBuf>,

    /// Overrides the configured energy sensor.
    #[clap(long = "entity-id")]
    pub entity_id: Option<String>,

    /// How far back to fetch the history from the live API.
    #[clap(long = "since-hours", default_value = "24")]
    pub since_hours: u32,

    /// Meter state file, restored before and saved after the replay.
    #[clap(long = "state", env = "TOU_STATE")]
    pub state: Option<PathBuf>,

    #[clap(flatten)]
    pub home_assistant: HomeAssistantArgs,
}

#[derive(Parser)]
pub struct HomeAssistantArgs {
    /// REST API root, for example, `http://homeassistant.local:8123/api`.
    #[clap(long = "home-assistant-base-url", env = "HOME_ASSISTANT_BASE_URL")]
    pub base_url: Option<String>,

    #[clap(long = "home-assistant-access-token", env = "HOME_ASSISTANT_ACCESS_TOKEN")]
    pub access_token: Option<String>,
}
