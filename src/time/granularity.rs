//! Time grains and granularities

use std::fmt;
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use crate::error::RequestError;
use super::interval::Interval;

/// A fixed bucketing period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeGrain {
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

/// The time-bucketing grain of a request
///
/// `All` puts the whole request range into a single bucket and therefore
/// has no boundaries and no zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    All,
    Zoned { grain: TimeGrain, zone: Tz },
}

impl TimeGrain {
    pub const ALL: [TimeGrain; 7] = [
        TimeGrain::Minute,
        TimeGrain::Hour,
        TimeGrain::Day,
        TimeGrain::Week,
        TimeGrain::Month,
        TimeGrain::Quarter,
        TimeGrain::Year,
    ];

    /// The API keyword of this grain
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Year => "year",
        }
    }

    /// The ISO 8601 period of one bucket
    pub fn iso_period(&self) -> &'static str {
        match self {
            Self::Minute => "PT1M",
            Self::Hour => "PT1H",
            Self::Day => "P1D",
            Self::Week => "P1W",
            Self::Month => "P1M",
            Self::Quarter => "P3M",
            Self::Year => "P1Y",
        }
    }

    /// Parse a keyword or a single-bucket ISO period, case-insensitively
    pub fn parse(text: &str) -> Option<TimeGrain> {
        Self::ALL.into_iter().find(|grain| {
            grain.keyword().eq_ignore_ascii_case(text) || grain.iso_period().eq_ignore_ascii_case(text)
        })
    }

    /// Check if a local wall-clock time falls on a bucket boundary
    pub fn is_aligned(&self, local: NaiveDateTime) -> bool {
        self.round_floor(local) == local
    }

    /// Start of the bucket containing a local wall-clock time
    pub fn round_floor(&self, local: NaiveDateTime) -> NaiveDateTime {
        let date = local.date();
        let midnight = |d: NaiveDate| d.and_time(NaiveTime::MIN);
        match self {
            Self::Minute => local
                .with_second(0)
                .and_then(|t| t.with_nanosecond(0))
                .unwrap_or(local),
            Self::Hour => date
                .and_hms_opt(local.hour(), 0, 0)
                .unwrap_or(local),
            Self::Day => midnight(date),
            Self::Week => {
                let offset = date.weekday().num_days_from_monday() as i64;
                midnight(date - Duration::days(offset))
            }
            Self::Month => midnight(date.with_day(1).unwrap_or(date)),
            Self::Quarter => {
                let month = (date.month0() / 3) * 3 + 1;
                NaiveDate::from_ymd_opt(date.year(), month, 1)
                    .map(midnight)
                    .unwrap_or(local)
            }
            Self::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1)
                .map(midnight)
                .unwrap_or(local),
        }
    }

    /// Move a local wall-clock time forward by a number of buckets
    pub fn add_buckets(&self, local: NaiveDateTime, count: u32) -> Option<NaiveDateTime> {
        let n = count as i64;
        match self {
            Self::Minute => local.checked_add_signed(Duration::minutes(n)),
            Self::Hour => local.checked_add_signed(Duration::hours(n)),
            Self::Day => local.checked_add_signed(Duration::days(n)),
            Self::Week => local.checked_add_signed(Duration::weeks(n)),
            Self::Month => local.checked_add_months(Months::new(count)),
            Self::Quarter => local.checked_add_months(Months::new(count * 3)),
            Self::Year => local.checked_add_months(Months::new(count * 12)),
        }
    }
}

impl Granularity {
    pub fn zoned(grain: TimeGrain, zone: Tz) -> Self {
        Self::Zoned { grain, zone }
    }

    /// The API keyword (`all`, `day`, ...)
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Zoned { grain, .. } => grain.keyword(),
        }
    }

    pub fn grain(&self) -> Option<TimeGrain> {
        match self {
            Self::All => None,
            Self::Zoned { grain, .. } => Some(*grain),
        }
    }

    pub fn zone(&self) -> Option<Tz> {
        match self {
            Self::All => None,
            Self::Zoned { zone, .. } => Some(*zone),
        }
    }

    /// Check if an instant is a bucket boundary (always true for `All`)
    pub fn is_boundary(&self, instant: DateTime<Utc>) -> bool {
        match self {
            Self::All => true,
            Self::Zoned { grain, zone } => grain.is_aligned(instant.with_timezone(zone).naive_local()),
        }
    }

    /// Check if both ends of an interval are bucket boundaries
    pub fn is_aligned(&self, interval: &Interval) -> bool {
        self.is_boundary(interval.start()) && self.is_boundary(interval.end())
    }

    /// Start of the bucket `offset` buckets after the one containing `instant`
    ///
    /// Returns `None` for `All`, which has no buckets to anchor on, and for
    /// local times that do not exist in the zone.
    pub fn bucket_start(&self, instant: DateTime<Utc>, offset: u32) -> Option<DateTime<Utc>> {
        let Self::Zoned { grain, zone } = self else {
            return None;
        };
        let floor = grain.round_floor(instant.with_timezone(zone).naive_local());
        let local = grain.add_buckets(floor, offset)?;
        zone.from_local_datetime(&local)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Resolves granularity keywords in a time zone
pub trait GranularityParser: Send + Sync + fmt::Debug {
    fn parse(&self, keyword: &str, zone: Tz) -> Result<Granularity, RequestError>;
}

/// Accepts `all`, the grain keywords and their single-bucket ISO periods
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardGranularityParser;

impl GranularityParser for StandardGranularityParser {
    fn parse(&self, keyword: &str, zone: Tz) -> Result<Granularity, RequestError> {
        let keyword = keyword.trim();
        if keyword.eq_ignore_ascii_case("all") {
            return Ok(Granularity::All);
        }
        TimeGrain::parse(keyword)
            .map(|grain| Granularity::zoned(grain, zone))
            .ok_or_else(|| RequestError::GranularityInvalid(keyword.to_string()))
    }
}
