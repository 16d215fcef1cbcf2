//! Time types (nouns)
//!
//! Granularities, intervals and the clock used to anchor relative intervals.

mod clock;
mod granularity;
mod interval;

pub use clock::{Clock, FixedClock, SystemClock};
pub use granularity::{Granularity, GranularityParser, StandardGranularityParser, TimeGrain};
pub use interval::{Interval, Period};
