//! High/low/average over a day of Celsius readings.

use crate::error::NoDataError;

/// Aggregated Fahrenheit values for a sample sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureStats {
    pub high: f64,
    pub low: f64,
    pub average: f64,
    pub count: usize,
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 1.8 + 32.0
}

/// Convert every sample to Fahrenheit and collect high, low and mean in one pass.
pub fn aggregate(samples: &[f64]) -> Result<TemperatureStats, NoDataError> {
    let (first, rest) = samples.split_first().ok_or(NoDataError)?;

    let first = celsius_to_fahrenheit(*first);
    let mut high = first;
    let mut low = first;
    let mut total = first;

    for celsius in rest {
        let f = celsius_to_fahrenheit(*celsius);
        high = high.max(f);
        low = low.min(f);
        total += f;
    }

    let count = samples.len();
    // Float rounding in the sum can land the mean a hair outside [low, high].
    let average = (total / count as f64).max(low).min(high);

    Ok(TemperatureStats { high, low, average, count })
}
