//! Synoptic Data time-series adapter.
//!
//! See <https://docs.synopticdata.com/services/time-series> for the query and
//! response format.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::{
    aggregate::aggregate,
    config::Config,
    error::{Error, FetchError, Result, truncate_body},
    model::{TemperatureSample, WeatherSummary},
    window::{DateWindow, parse_timezone, previous_day_in},
};

use super::WeatherProvider;

const AIR_TEMP_VAR: &str = "air_temp";
const AIR_TEMP_SET_PREFIX: &str = "air_temp_set_";

#[derive(Debug, Clone)]
pub struct SynopticProvider {
    http: Client,
    base_url: String,
    api_token: String,
    station_id: String,
    timezone: Tz,
}

impl SynopticProvider {
    /// Fails on a missing token or unknown timezone, before any request is made.
    pub fn new(config: &Config) -> Result<Self> {
        let synoptic = &config.synoptic;
        let api_token = config.synoptic_token()?.to_owned();
        let timezone = parse_timezone(&synoptic.timezone)?;

        let http = Client::builder()
            .timeout(synoptic.timeout())
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: synoptic.base_url.clone(),
            api_token,
            station_id: synoptic.station_id.clone(),
            timezone,
        })
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Timestamped air temperature readings for the station within `window`.
    pub async fn fetch_samples(
        &self,
        window: &DateWindow,
    ) -> Result<Vec<TemperatureSample>, FetchError> {
        Ok(self.fetch_series(window).await?.into_samples())
    }

    async fn fetch_series(&self, window: &DateWindow) -> Result<AirTempSeries, FetchError> {
        let (start, end) = window.query_bounds();

        info!(station = %self.station_id, %start, %end, "Requesting temperature data");

        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("token", self.api_token.as_str()),
                ("stid", self.station_id.as_str()),
                ("vars", AIR_TEMP_VAR),
                ("start", start.as_str()),
                ("end", end.as_str()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(FetchError::Status { status, body: truncate_body(&body) });
        }

        let parsed: TimeSeriesResponse = serde_json::from_str(&body)?;
        parsed.into_series()
    }
}

#[async_trait]
impl WeatherProvider for SynopticProvider {
    async fn previous_day_weather(&self, reference: DateTime<Utc>) -> Result<WeatherSummary> {
        let window = previous_day_in(reference, self.timezone);
        let series = self.fetch_series(&window).await?;

        let stats = aggregate(&series.readings())?;

        debug!(count = stats.count, high = stats.high, low = stats.low, "Aggregated samples");

        Ok(WeatherSummary {
            date: window.date(),
            high: stats.high,
            low: stats.low,
            average: stats.average,
        })
    }
}

#[derive(Debug, Deserialize)]
struct TimeSeriesResponse {
    #[serde(rename = "STATION", default)]
    station: Vec<Station>,
    #[serde(rename = "SUMMARY")]
    summary: Option<Summary>,
}

#[derive(Debug, Deserialize)]
struct Summary {
    #[serde(rename = "RESPONSE_CODE")]
    response_code: i64,
    #[serde(rename = "RESPONSE_MESSAGE", default)]
    response_message: String,
}

#[derive(Debug, Deserialize)]
struct Station {
    #[serde(rename = "STID", default)]
    stid: String,
    #[serde(rename = "OBSERVATIONS", default)]
    observations: Observations,
}

#[derive(Debug, Default, Deserialize)]
struct Observations {
    #[serde(default)]
    date_time: Vec<DateTime<Utc>>,
    /// Sensor series keyed by set name, e.g. `air_temp_set_1`.
    #[serde(flatten)]
    sets: BTreeMap<String, serde_json::Value>,
}

/// One station's air temperature series. `celsius` may be longer than
/// `date_time` when the provider omits timestamps.
#[derive(Debug, Default)]
struct AirTempSeries {
    date_time: Vec<DateTime<Utc>>,
    celsius: Vec<Option<f64>>,
}

impl AirTempSeries {
    /// Every non-null reading, with or without a timestamp.
    fn readings(&self) -> Vec<f64> {
        self.celsius.iter().flatten().copied().collect()
    }

    fn into_samples(self) -> Vec<TemperatureSample> {
        self.date_time
            .into_iter()
            .zip(self.celsius)
            .filter_map(|(timestamp, celsius)| {
                celsius.map(|celsius| TemperatureSample { timestamp, celsius })
            })
            .collect()
    }
}

impl TimeSeriesResponse {
    fn into_series(self) -> Result<AirTempSeries, FetchError> {
        if let Some(summary) = &self.summary {
            match summary.response_code {
                // 2 means "no stations matched", which the station check below reports.
                1 | 2 => {}
                code => {
                    return Err(FetchError::Provider {
                        code,
                        message: summary.response_message.clone(),
                    });
                }
            }
        }

        let station = self.station.into_iter().next().ok_or(FetchError::NoStation)?;
        let Observations { date_time, sets } = station.observations;

        let Some((set, values)) = sets.into_iter().find(|(k, _)| k.starts_with(AIR_TEMP_SET_PREFIX))
        else {
            debug!(station = %station.stid, "Station returned no air temperature series");
            return Ok(AirTempSeries::default());
        };

        let celsius: Vec<Option<f64>> = serde_json::from_value(values)?;
        debug!(station = %station.stid, %set, readings = celsius.len(), "Parsed observations");

        if date_time.len() != celsius.len() {
            warn!(
                station = %station.stid,
                timestamps = date_time.len(),
                readings = celsius.len(),
                "Timestamp and reading counts differ"
            );
        }

        Ok(AirTempSeries { date_time, celsius })
    }
}
