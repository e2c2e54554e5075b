use crate::model::WeatherSummary;

/// Render the SMS body. Temperatures are rounded up to whole degrees.
pub fn format_message(summary: &WeatherSummary) -> String {
    format!(
        "\nWeather for {}:\n\u{2600}\u{fe0f} High: {}°\n\u{2744}\u{fe0f} Low: {}°\n\u{1f600} Avg: {}°",
        summary.date.format("%b %-d %Y"),
        whole_degrees(summary.high),
        whole_degrees(summary.low),
        whole_degrees(summary.average),
    )
}

// Going through i64 keeps -0.4 from printing as "-0".
fn whole_degrees(fahrenheit: f64) -> i64 {
    fahrenheit.ceil() as i64
}
