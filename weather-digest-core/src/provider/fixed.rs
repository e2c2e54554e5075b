use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    error::{Error, FetchError, NoDataError, Result},
    model::WeatherSummary,
};

use super::WeatherProvider;

/// In-memory provider that hands back a preset answer without touching the network.
#[derive(Debug, Clone)]
pub struct FixedWeatherProvider {
    answer: Answer,
}

#[derive(Debug, Clone)]
enum Answer {
    Summary(WeatherSummary),
    NoStation,
    NoData,
}

impl FixedWeatherProvider {
    pub fn new(summary: WeatherSummary) -> Self {
        Self { answer: Answer::Summary(summary) }
    }

    /// A provider whose fetch always fails with an empty station list.
    pub fn failing() -> Self {
        Self { answer: Answer::NoStation }
    }

    /// A provider whose station reports no samples.
    pub fn empty() -> Self {
        Self { answer: Answer::NoData }
    }
}

#[async_trait]
impl WeatherProvider for FixedWeatherProvider {
    async fn previous_day_weather(&self, _reference: DateTime<Utc>) -> Result<WeatherSummary> {
        match &self.answer {
            Answer::Summary(summary) => Ok(*summary),
            Answer::NoStation => Err(Error::Fetch(FetchError::NoStation)),
            Answer::NoData => Err(Error::NoData(NoDataError)),
        }
    }
}
