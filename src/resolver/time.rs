//! Time zone, granularity and intervals

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use indexmap::IndexSet;
use tracing::{debug, trace};
use crate::error::RequestError;
use crate::time::{Granularity, GranularityParser, Interval, Period};
use crate::tokens::split_optional;

/// Macro for the start of the bucket containing now
pub const CURRENT: &str = "current";
/// Same as [`CURRENT`]
pub const LATEST: &str = "latest";
/// Macro for the start of the bucket after the one containing now
pub const NEXT: &str = "next";

/// Resolve an IANA time zone name, falling back to `default`
pub fn resolve_time_zone(raw: Option<&str>, default: Tz) -> Result<Tz, RequestError> {
    match raw.map(str::trim).filter(|z| !z.is_empty()) {
        None => Ok(default),
        Some(name) => name.parse::<Tz>().map_err(|_| {
            debug!(time_zone = name, "Unknown time zone");
            RequestError::TimeZoneInvalid(name.to_string())
        }),
    }
}

/// Resolve the granularity keyword in the request's zone
pub fn resolve_granularity(
    raw: &str,
    zone: Tz,
    parser: &dyn GranularityParser,
) -> Result<Granularity, RequestError> {
    let keyword = raw.trim();
    if keyword.is_empty() {
        debug!("No granularity requested");
        return Err(RequestError::GranularityInvalid(keyword.to_string()));
    }
    parser.parse(keyword, zone).inspect_err(|_| {
        debug!(granularity = keyword, "Unknown granularity");
    })
}

/// One side of an interval token
#[derive(Debug, Clone, Copy, PartialEq)]
enum Endpoint {
    Instant(DateTime<Utc>),
    Period(Period),
}

/// Resolve the intervals parameter
///
/// Malformed tokens fail on the first one found. Once every token parses,
/// every interval not aligned to the granularity is reported in one error.
/// Duplicate intervals collapse; overlapping ones are kept as given.
pub fn resolve_intervals(
    raw: Option<&str>,
    granularity: &Granularity,
    zone: Tz,
    now: DateTime<Utc>,
) -> Result<IndexSet<Interval>, RequestError> {
    let tokens = split_optional(raw);
    if tokens.is_empty() {
        debug!("No intervals requested");
        return Err(RequestError::IntervalsMissing);
    }

    let mut intervals = IndexSet::new();
    let mut unaligned = IndexSet::new();
    for token in tokens {
        let interval = parse_interval(token, granularity, zone, now)?;
        if !granularity.is_aligned(&interval) {
            unaligned.insert(token.to_string());
        }
        intervals.insert(interval);
    }

    if !unaligned.is_empty() {
        debug!(granularity = %granularity, intervals = ?unaligned, "Intervals not aligned to granularity");
        return Err(RequestError::IntervalNotAligned {
            granularity: granularity.to_string(),
            intervals: unaligned.into_iter().collect(),
        });
    }

    trace!(intervals = ?intervals.iter().map(ToString::to_string).collect::<Vec<_>>(), "Generated intervals");
    Ok(intervals)
}

fn parse_interval(
    token: &str,
    granularity: &Granularity,
    zone: Tz,
    now: DateTime<Utc>,
) -> Result<Interval, RequestError> {
    let invalid = |reason: &str| {
        debug!(interval = token, reason, "Invalid interval");
        RequestError::IntervalInvalid {
            interval: token.to_string(),
            reason: reason.to_string(),
        }
    };

    let (start, end) = token
        .split_once('/')
        .ok_or_else(|| invalid("expected start/end"))?;
    let start = parse_endpoint(start.trim(), granularity, zone, now).map_err(|r| invalid(&r))?;
    let end = parse_endpoint(end.trim(), granularity, zone, now).map_err(|r| invalid(&r))?;

    let shift = |instant: DateTime<Utc>, period: &Period, forward: bool| {
        let local = instant.with_timezone(&zone).naive_local();
        let moved = if forward { period.add_to(local) } else { period.subtract_from(local) };
        moved.and_then(|local| to_utc(zone, local))
    };
    let (start, end) = match (start, end) {
        (Endpoint::Instant(s), Endpoint::Instant(e)) => (s, e),
        (Endpoint::Instant(s), Endpoint::Period(p)) => {
            (s, shift(s, &p, true).ok_or_else(|| invalid("end is out of range"))?)
        }
        (Endpoint::Period(p), Endpoint::Instant(e)) => {
            (shift(e, &p, false).ok_or_else(|| invalid("start is out of range"))?, e)
        }
        (Endpoint::Period(_), Endpoint::Period(_)) => {
            return Err(invalid("a period may appear on one side only"));
        }
    };

    Interval::new(start, end).ok_or_else(|| invalid("start must be before end"))
}

fn parse_endpoint(
    text: &str,
    granularity: &Granularity,
    zone: Tz,
    now: DateTime<Utc>,
) -> Result<Endpoint, String> {
    let offset = if text.eq_ignore_ascii_case(CURRENT) || text.eq_ignore_ascii_case(LATEST) {
        Some(0)
    } else if text.eq_ignore_ascii_case(NEXT) {
        Some(1)
    } else {
        None
    };
    if let Some(offset) = offset {
        if *granularity == Granularity::All {
            return Err(format!("'{text}' cannot be used with the all granularity"));
        }
        return granularity
            .bucket_start(now, offset)
            .map(Endpoint::Instant)
            .ok_or_else(|| format!("'{text}' does not resolve to an instant"));
    }

    if text.starts_with(['P', 'p']) {
        return Period::parse(text)
            .map(Endpoint::Period)
            .ok_or_else(|| format!("'{text}' is not an ISO 8601 period"));
    }

    parse_instant(text, zone)
        .map(Endpoint::Instant)
        .ok_or_else(|| format!("'{text}' is not a date, date-time or period"))
}

/// Parse an RFC 3339 instant, or a local date or date-time in `zone`
fn parse_instant(text: &str, zone: Tz) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Some(instant.with_timezone(&Utc));
    }
    if let Ok(local) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return to_utc(zone, local);
    }
    if let Ok(local) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M") {
        return to_utc(zone, local);
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| to_utc(zone, date.and_time(NaiveTime::MIN)))
}

fn to_utc(zone: Tz, local: NaiveDateTime) -> Option<DateTime<Utc>> {
    zone.from_local_datetime(&local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}
