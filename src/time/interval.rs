//! Absolute intervals and ISO 8601 periods

use std::fmt;
use chrono::{DateTime, Duration, Months, NaiveDateTime, SecondsFormat, Utc};

/// A half-open `[start, end)` range of instants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Interval {
    /// Build an interval, `None` unless start is strictly before end
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}",
            self.start.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.end.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }
}

/// An ISO 8601 period such as `P3D`, `P1Y2M` or `PT6H`
///
/// Calendar parts (years, months) are applied with month arithmetic so that
/// `P1M` after January 31st lands on the last day of February.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Period {
    pub years: u32,
    pub months: u32,
    pub weeks: u32,
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl Period {
    /// Parse an ISO 8601 period, case-insensitively
    ///
    /// Returns `None` for anything that is not `P` followed by at least one
    /// `<number><unit>` component.
    pub fn parse(text: &str) -> Option<Period> {
        let upper = text.trim().to_ascii_uppercase();
        let rest = upper.strip_prefix('P')?;
        let mut period = Period::default();
        let mut in_time = false;
        let mut number = String::new();
        let mut seen_component = false;

        for c in rest.chars() {
            match c {
                '0'..='9' => number.push(c),
                'T' if !in_time && number.is_empty() => in_time = true,
                unit => {
                    let value: u32 = number.parse().ok()?;
                    number.clear();
                    let slot = match (in_time, unit) {
                        (false, 'Y') => &mut period.years,
                        (false, 'M') => &mut period.months,
                        (false, 'W') => &mut period.weeks,
                        (false, 'D') => &mut period.days,
                        (true, 'H') => &mut period.hours,
                        (true, 'M') => &mut period.minutes,
                        (true, 'S') => &mut period.seconds,
                        _ => return None,
                    };
                    *slot = value;
                    seen_component = true;
                }
            }
        }

        (seen_component && number.is_empty()).then_some(period)
    }

    fn total_months(&self) -> Option<Months> {
        let months = self.years.checked_mul(12)?.checked_add(self.months)?;
        Some(Months::new(months))
    }

    /// Weeks, days and time parts as one duration, `None` when out of range
    fn fixed(&self) -> Option<Duration> {
        [
            Duration::try_weeks(self.weeks.into())?,
            Duration::try_days(self.days.into())?,
            Duration::try_hours(self.hours.into())?,
            Duration::try_minutes(self.minutes.into())?,
            Duration::try_seconds(self.seconds.into())?,
        ]
        .into_iter()
        .try_fold(Duration::zero(), |total, part| total.checked_add(&part))
    }

    /// Move a local wall-clock time forward by this period
    pub fn add_to(&self, local: NaiveDateTime) -> Option<NaiveDateTime> {
        local
            .checked_add_months(self.total_months()?)?
            .checked_add_signed(self.fixed()?)
    }

    /// Move a local wall-clock time back by this period
    pub fn subtract_from(&self, local: NaiveDateTime) -> Option<NaiveDateTime> {
        local
            .checked_sub_months(self.total_months()?)?
            .checked_sub_signed(self.fixed()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn local(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    #[test]
    fn test_interval_requires_positive_length() {
        let a = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap();
        assert!(Interval::new(a, b).is_some());
        assert!(Interval::new(b, a).is_none());
        assert!(Interval::new(a, a).is_none());
        assert_eq!(
            Interval::new(a, b).unwrap().to_string(),
            "2020-01-01T00:00:00Z/2020-01-02T00:00:00Z"
        );
    }

    #[test]
    fn test_parse_period() {
        assert_eq!(Period::parse("P3D"), Some(Period { days: 3, ..Default::default() }));
        assert_eq!(
            Period::parse("p1y2mt6h"),
            Some(Period { years: 1, months: 2, hours: 6, ..Default::default() })
        );
        assert_eq!(Period::parse("PT30M"), Some(Period { minutes: 30, ..Default::default() }));
        assert_eq!(Period::parse("P"), None);
        assert_eq!(Period::parse("P3"), None);
        assert_eq!(Period::parse("P3H"), None);
        assert_eq!(Period::parse("2020-01-01"), None);
    }

    #[test]
    fn test_period_arithmetic() {
        let month = Period::parse("P1M").unwrap();
        assert_eq!(month.add_to(local("2020-01-31T00:00:00")), Some(local("2020-02-29T00:00:00")));
        let week = Period::parse("P2W").unwrap();
        assert_eq!(week.subtract_from(local("2020-01-15T00:00:00")), Some(local("2020-01-01T00:00:00")));
    }

    #[test]
    fn test_period_out_of_range() {
        let start = local("2020-01-01T00:00:00");
        for text in ["P400000000Y", "P4294967295M", "P4000000000W", "P4000000000D", "PT4000000000H"] {
            let period = Period::parse(text).unwrap();
            assert_eq!(period.add_to(start), None, "{text}");
            assert_eq!(period.subtract_from(start), None, "{text}");
        }
    }
}
