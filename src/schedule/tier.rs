use serde::{Deserialize, Serialize};

use crate::quantity::rate::KilowattHourRate;

#[derive(
    Clone,
    Debug,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct TierId(String);

impl TierId {
    /// Used when no tier is configured at all.
    pub const OFF_PEAK: &'static str = "off-peak";

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TierId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// Named rate bucket.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateTier {
    pub id: TierId,
    pub name: String,
    pub rate: KilowattHourRate,

    /// Display color, for example, `#22c55e`.
    pub color: String,
}
