mod cli;

use std::sync::Arc;

use chrono::{Datelike, Local, TimeDelta};
use clap::{Parser, crate_version};
use solarseed_tou::{
    api::home_assistant::{self, EntitiesHistory, EntityHistory},
    config::{ConfigStore, ScheduleConfig},
    meter::{Meter, MeterSnapshot},
    prelude::*,
    schedule::Schedule,
    tables::{build_day_table, build_holidays_table, build_meter_table, build_status_table},
};

use crate::cli::{Args, Command, InitArgs, ReplayArgs};

fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().without_time().compact().init();
    info!(version = crate_version!(), "starting…");

    let args = Args::parse();
    let store = ConfigStore::new(&args.config);

    match args.command {
        Command::Init(args) => init(&store, args)?,
        Command::Validate => {
            let schedule = Schedule::from_config(store.load()?)?;
            info!(
                n_tiers = schedule.tiers().len(),
                n_seasons = schedule.seasons().len(),
                fallback_tier = %schedule.fallback_tier(),
                "the configuration is valid",
            );
        }
        Command::Update { updates } => {
            let updates = serde_json::from_str(&updates).context("failed to parse the updates")?;
            let schedule = store.update(updates)?;
            info!(energy_sensor = schedule.energy_sensor(), "updated");
        }
        Command::Rate { at } => {
            let schedule = Schedule::from_config(store.load()?)?;
            let at = at.unwrap_or_else(|| Local::now().naive_local());
            println!("{}", build_status_table(&schedule.status(at)));
        }
        Command::Day { date } => {
            let schedule = Schedule::from_config(store.load()?)?;
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            println!("{}", build_day_table(&schedule, date));
        }
        Command::Holidays { year } => {
            let schedule = Schedule::from_config(store.load()?)?;
            let year = year.unwrap_or_else(|| Local::now().year());
            println!("{}", build_holidays_table(&schedule, year));
        }
        Command::Replay(args) => replay(&store, *args)?,
    }

    Ok(())
}

#[instrument(skip_all)]
fn init(store: &ConfigStore, args: InitArgs) -> Result {
    if store.path().exists() && !args.force {
        bail!("`{}` already exists, use `--force` to overwrite", store.path().display());
    }
    let config = ScheduleConfig::new_default(args.energy_sensor);
    store.save(&config)?;
    info!(path = %store.path().display(), "written the default configuration");
    Ok(())
}

#[instrument(skip_all)]
fn replay(store: &ConfigStore, args: ReplayArgs) -> Result {
    let schedule = Arc::new(Schedule::from_config(store.load()?)?);
    let entity_id =
        args.entity_id.as_deref().unwrap_or_else(|| schedule.energy_sensor()).to_owned();
    let history = fetch_history(&args, &entity_id)?;

    let mut meter = Meter::new(schedule);
    if let Some(state) = &args.state {
        meter.restore(MeterSnapshot::read_from(state)?, Local::now().date_naive());
    }

    let mut n_events = 0_usize;
    for state in &history.0 {
        // States up to the restored position were replayed by the previous run.
        if meter.last_reading_at().is_some_and(|last_reading_at| {
            state.last_changed_at <= last_reading_at
        }) {
            continue;
        }
        if let Some(event) = state.to_event() {
            meter.on_event(&event);
            n_events += 1;
        }
    }
    info!(n_states = history.0.len(), n_events, "replayed");

    if let Some(state) = &args.state {
        meter.snapshot().write_to(state)?;
    }
    println!("{}", build_meter_table(&meter));
    Ok(())
}

fn fetch_history(args: &ReplayArgs, entity_id: &str) -> Result<EntityHistory> {
    if let Some(path) = &args.history_file {
        return Ok(EntitiesHistory::read_from(path)?.into_entity());
    }
    let base_url = args
        .home_assistant
        .base_url
        .as_deref()
        .context("either `--history-file` or `--home-assistant-base-url` is required")?;
    let access_token = args
        .home_assistant
        .access_token
        .as_deref()
        .context("`--home-assistant-access-token` is required")?;
    let until = Local::now();
    home_assistant::Api::new(base_url, access_token).get_history(
        entity_id,
        until - TimeDelta::hours(i64::from(args.since_hours)),
        until,
    )
}
