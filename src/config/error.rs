use itertools::Itertools;

use crate::schedule::TierId;

/// Configuration rejected by validation, with every problem found.
#[derive(Debug, thiserror::Error)]
#[error("invalid configuration: {}", .0.iter().join("; "))]
pub struct InvalidConfig(pub Vec<Problem>);

#[derive(Debug, thiserror::Error)]
pub enum Problem {
    #[error("tier ID must not be empty")]
    EmptyTierId,

    #[error("tier `{0}` is defined more than once")]
    DuplicateTier(TierId),

    #[error("tier `{tier}` has an invalid rate {rate}")]
    InvalidRate { tier: TierId, rate: f64 },

    #[error("season `{season}` refers to month {month}")]
    InvalidSeasonMonth { season: String, month: u32 },

    #[error("custom holiday #{index} refers to month {month}")]
    InvalidHolidayMonth { index: usize, month: u32 },

    #[error("custom holiday #{index} refers to non-existent day {month:02}-{day:02}")]
    InvalidHolidayDay { index: usize, month: u32, day: u32 },

    #[error("custom holiday #{index} has occurrence {n}, expected 1 to 5")]
    InvalidOccurrence { index: usize, n: u32 },
}
