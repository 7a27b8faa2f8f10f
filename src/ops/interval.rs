use chrono::{DateTime, DurationRound, FixedOffset, NaiveDate, TimeDelta, TimeZone, Utc};

use crate::{ops::RangeExclusive, prelude::*};

pub type Interval<Tz = FixedOffset> = RangeExclusive<DateTime<Tz>>;

impl<Tz> Interval<Tz>
where
    Tz: TimeZone,
    DateTime<Tz>: Copy,
{
    pub fn with_timezone<Tz2>(self, timezone: &Tz2) -> Interval<Tz2>
    where
        Tz2: TimeZone,
        DateTime<Tz2>: Copy,
    {
        Interval { start: self.start.with_timezone(timezone), end: self.end.with_timezone(timezone) }
    }
}

impl Interval<Utc> {
    /// Build the interval from Unix seconds and a duration in seconds.
    pub fn try_from_unix(start: i64, duration: i64) -> Option<Self> {
        let start = DateTime::from_timestamp(start, 0)?;
        let end = start.checked_add_signed(TimeDelta::try_seconds(duration)?)?;
        Some(Self { start, end })
    }
}

impl Interval {
    /// Expand the interval outwards to whole local hours.
    pub fn try_align_to_hours(self) -> Result<Self> {
        let hour = TimeDelta::hours(1);
        let start = self.start.duration_trunc(hour)?;
        let end = self.end.duration_trunc(hour)?;
        let end = if end < self.end { end + hour } else { end };
        Ok(Self { start, end })
    }

    /// Local calendar date of the start.
    #[must_use]
    pub fn date(self) -> NaiveDate {
        self.start.date_naive()
    }
}
