use chrono::{DateTime, NaiveDate, Utc};

/// Daily temperature summary in Fahrenheit, unrounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherSummary {
    pub date: NaiveDate,
    pub high: f64,
    pub low: f64,
    pub average: f64,
}

/// A single provider reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureSample {
    pub timestamp: DateTime<Utc>,
    pub celsius: f64,
}
