//! Previous-day query window in the station's local timezone.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{Error, Result};

/// Timestamp layout the weather provider expects for `start`/`end`.
pub const QUERY_TIME_FORMAT: &str = "%Y%m%d%H%M";

/// One local calendar day, from midnight to 23h59m later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateWindow {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl DateWindow {
    /// Local calendar date the window covers.
    pub fn date(&self) -> NaiveDate {
        self.start.date_naive()
    }

    /// Both ends rendered in UTC as `YYYYMMDDhhmm`.
    pub fn query_bounds(&self) -> (String, String) {
        (
            self.start.with_timezone(&Utc).format(QUERY_TIME_FORMAT).to_string(),
            self.end.with_timezone(&Utc).format(QUERY_TIME_FORMAT).to_string(),
        )
    }
}

/// Resolve an IANA identifier such as `America/Chicago`.
pub fn parse_timezone(id: &str) -> Result<Tz> {
    id.parse::<Tz>().map_err(|_| Error::config(format!("unknown timezone '{id}'")))
}

/// Window for the day before `now`, in the named timezone.
pub fn previous_day(now: DateTime<Utc>, timezone: &str) -> Result<DateWindow> {
    Ok(previous_day_in(now, parse_timezone(timezone)?))
}

pub fn previous_day_in(now: DateTime<Utc>, tz: Tz) -> DateWindow {
    let day = (now - Duration::hours(24)).with_timezone(&tz).date_naive();

    let start = first_valid_local(tz, day.and_time(NaiveTime::MIN));
    // Elapsed 23h59m, not wall-clock 23:59; the two differ on DST transition days.
    let end = start + Duration::minutes(23 * 60 + 59);

    DateWindow { start, end }
}

/// Map a wall-clock time to an instant, stepping past DST gaps and taking the
/// earlier instant when the wall clock repeats.
fn first_valid_local(tz: Tz, local: NaiveDateTime) -> DateTime<Tz> {
    (0..=8)
        .map(|quarter| local + Duration::minutes(15 * quarter))
        .find_map(|candidate| tz.from_local_datetime(&candidate).earliest())
        .unwrap_or_else(|| tz.from_utc_datetime(&local))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::Chicago;

    fn utc(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn previous_day_in_chicago() {
        let window = previous_day(utc("2023-01-11T12:00:00Z"), "America/Chicago").unwrap();

        assert_eq!(window.start.to_rfc3339(), "2023-01-10T00:00:00-06:00");
        assert_eq!(window.end.to_rfc3339(), "2023-01-10T23:59:00-06:00");
        assert_eq!(window.start, Chicago.with_ymd_and_hms(2023, 1, 10, 0, 0, 0).unwrap());
        assert_eq!(window.date(), NaiveDate::from_ymd_opt(2023, 1, 10).unwrap());
        assert_eq!(window.end - window.start, Duration::minutes(23 * 60 + 59));
    }

    #[test]
    fn utc_morning_is_still_previous_local_day() {
        // 03:00Z is 21:00 the evening before in Chicago.
        let window = previous_day_in(utc("2023-01-11T03:00:00Z"), Chicago);
        assert_eq!(window.date(), NaiveDate::from_ymd_opt(2023, 1, 9).unwrap());
    }

    #[test]
    fn query_bounds_are_utc() {
        let window = previous_day_in(utc("2023-01-11T12:00:00Z"), Chicago);
        let (start, end) = window.query_bounds();

        assert_eq!(start, "202301100600");
        assert_eq!(end, "202301110559");
    }

    #[test]
    fn spring_forward_day_end_is_elapsed_time_from_start() {
        let window = previous_day_in(utc("2023-03-13T12:00:00Z"), Chicago);

        assert_eq!(window.start.to_rfc3339(), "2023-03-12T00:00:00-06:00");
        assert_eq!(window.end.to_rfc3339(), "2023-03-13T00:59:00-05:00");
        assert_eq!(window.end - window.start, Duration::minutes(23 * 60 + 59));
    }

    #[test]
    fn fall_back_day_end_is_elapsed_time_from_start() {
        let window = previous_day_in(utc("2023-11-06T12:00:00Z"), Chicago);

        assert_eq!(window.start.to_rfc3339(), "2023-11-05T00:00:00-05:00");
        assert_eq!(window.end.to_rfc3339(), "2023-11-05T22:59:00-06:00");
    }

    #[test]
    fn midnight_gap_moves_to_first_valid_instant() {
        // Sao Paulo skipped from 00:00 to 01:00 on 2018-11-04.
        let window = previous_day(utc("2018-11-05T15:00:00Z"), "America/Sao_Paulo").unwrap();
        assert_eq!(window.start.to_rfc3339(), "2018-11-04T01:00:00-02:00");
    }

    #[test]
    fn unknown_timezone_is_configuration_error() {
        let err = previous_day(utc("2023-01-11T12:00:00Z"), "Mars/Olympus_Mons").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().contains("Mars/Olympus_Mons"));
    }
}
