use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Debug;

use crate::{error::Result, model::WeatherSummary};

pub mod fixed;
pub mod synoptic;

pub use fixed::FixedWeatherProvider;
pub use synoptic::SynopticProvider;

/// Source of daily temperature summaries.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Summary for the local calendar day before `reference`.
    async fn previous_day_weather(&self, reference: DateTime<Utc>) -> Result<WeatherSummary>;
}
