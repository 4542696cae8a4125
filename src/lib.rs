//! Time-of-use electricity rate schedule resolution and cost metering.

pub mod api;
pub mod config;
pub mod holiday;
pub mod meter;
pub mod prelude;
pub mod quantity;
pub mod schedule;
pub mod tables;
