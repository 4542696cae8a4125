use chrono::NaiveDateTime;

use crate::{
    quantity::rate::KilowattHourRate,
    schedule::{RateTier, TierId},
};

/// Everything known about the rate at an instant.
#[must_use]
#[derive(Debug)]
pub struct RateStatus<'a> {
    pub at: NaiveDateTime,
    pub tier_id: &'a TierId,

    /// [`None`] when the resolved tier is not defined.
    pub tier: Option<&'a RateTier>,

    pub rate: KilowattHourRate,
    pub is_holiday: bool,

    /// Next tier change within the scan window.
    pub next_change: Option<(NaiveDateTime, &'a TierId)>,

    pub next_tier: Option<&'a RateTier>,
}

impl<'a> RateStatus<'a> {
    /// Display name of the current tier, or its ID when it is not defined.
    #[must_use]
    pub fn tier_name(&self) -> &'a str {
        self.tier.map_or_else(|| self.tier_id.as_str(), |tier| tier.name.as_str())
    }

    /// Display name of the next tier, or its ID when it is not defined.
    #[must_use]
    pub fn next_tier_name(&self) -> Option<&'a str> {
        let (_, tier_id) = self.next_change?;
        Some(self.next_tier.map_or_else(|| tier_id.as_str(), |tier| tier.name.as_str()))
    }
}
