//! Home Assistant history of the source energy sensor.

use std::{path::Path, time::Duration};

use chrono::{DateTime, Local, SecondsFormat, Utc};
use serde::Deserialize;
use serde_with::serde_as;
use ureq::Agent;

use crate::{meter::SensorEvent, prelude::*};

pub struct Api {
    client: Agent,
    base_url: String,
    access_token: String,
}

impl Api {
    /// Base URL is the REST API root, for example, `http://homeassistant.local:8123/api`.
    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        let client =
            Agent::config_builder().timeout_global(Some(Duration::from_secs(10))).build().into();
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            access_token: access_token.into(),
        }
    }

    #[instrument(skip_all, fields(entity_id = entity_id))]
    pub fn get_history(
        &self,
        entity_id: &str,
        since: DateTime<Local>,
        until: DateTime<Local>,
    ) -> Result<EntityHistory> {
        info!("fetching the entity state changes…");
        let url = format!(
            "{}/history/period/{}",
            self.base_url,
            since.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Secs, true),
        );
        let history = self
            .client
            .get(url.as_str())
            .header("Authorization", format!("Bearer {}", self.access_token))
            .query("filter_entity_id", entity_id)
            .query("end_time", until.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Secs, true))
            .call()
            .with_context(|| format!("failed to request the history from `{url}`"))?
            .body_mut()
            .read_json::<EntitiesHistory>()
            .context("failed to deserialize the history")?
            .into_entity();
        info!(n_states = history.0.len(), "fetched");
        Ok(history)
    }
}

#[must_use]
#[derive(Deserialize, derive_more::IntoIterator)]
pub struct EntitiesHistory(pub Vec<EntityHistory>);

impl EntitiesHistory {
    /// Read a history previously exported from `/api/history/period`.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn read_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read `{}`", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse `{}`", path.display()))
    }

    /// History of the single requested entity.
    pub fn into_entity(self) -> EntityHistory {
        self.0.into_iter().next().unwrap_or_default()
    }
}

#[must_use]
#[serde_as]
#[derive(Default, Deserialize, derive_more::Index, derive_more::IntoIterator)]
pub struct EntityHistory(#[serde_as(as = "serde_with::VecSkipError<_>")] pub Vec<State>);

#[must_use]
#[derive(Clone, Deserialize)]
pub struct State {
    #[serde(rename = "last_changed")]
    pub last_changed_at: DateTime<Local>,

    pub state: String,

    #[serde(default)]
    pub attributes: Attributes,
}

#[derive(Clone, Default, Deserialize)]
pub struct Attributes {
    pub unit_of_measurement: Option<String>,
    pub device_class: Option<String>,
}

impl State {
    /// Convert the state change into a meter event, if it carries any meaning.
    pub fn to_event(&self) -> Option<SensorEvent<Local>> {
        SensorEvent::from_state(
            &self.state,
            self.attributes.unit_of_measurement.as_deref(),
            self.attributes.device_class.as_deref(),
            self.last_changed_at,
        )
    }
}
