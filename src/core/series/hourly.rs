use chrono::{FixedOffset, NaiveDate, TimeDelta};
use itertools::Itertools;
use serde::Serialize;

use crate::{
    espi::IntervalReading,
    ops::{RangeExclusive, interval::Interval},
    prelude::*,
    quantity::{energy::KilowattHours, power::Kilowatts, time::Hours},
};

/// Usage within one local clock hour.
#[must_use]
#[derive(Copy, Clone, Debug, Serialize)]
pub struct HourlyUsage {
    pub interval: Interval,

    pub energy: KilowattHours,

    /// Time of the hour covered by readings, zero for a gap.
    #[serde(skip)]
    pub coverage: TimeDelta,
}

impl HourlyUsage {
    const fn empty(interval: Interval) -> Self {
        Self { interval, energy: KilowattHours::ZERO, coverage: TimeDelta::zero() }
    }

    #[must_use]
    pub const fn is_gap(&self) -> bool {
        self.coverage.is_zero()
    }

    /// Average power over the hour.
    pub fn power(&self) -> Kilowatts {
        self.energy / Hours::from(self.interval.len())
    }

    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.interval.date()
    }
}

/// Total usage of one local calendar day.
#[must_use]
#[derive(Copy, Clone, Debug, Serialize)]
pub struct DailyUsage {
    pub date: NaiveDate,
    pub energy: KilowattHours,
    pub n_hours: usize,
    pub n_gap_hours: usize,
}

impl DailyUsage {
    fn from_hours(date: NaiveDate, hours: &[HourlyUsage]) -> Self {
        Self {
            date,
            energy: hours.iter().map(|hour| hour.energy).sum(),
            n_hours: hours.len(),
            n_gap_hours: hours.iter().filter(|hour| hour.is_gap()).count(),
        }
    }

    #[must_use]
    pub const fn has_data(&self) -> bool {
        self.n_gap_hours < self.n_hours
    }
}

/// Contiguous, strictly increasing hourly usage.
///
/// Hours without any reading are kept in the series with zero energy and flagged
/// as gaps.
#[must_use]
#[derive(derive_more::Deref)]
pub struct HourlySeries(Vec<HourlyUsage>);

impl HourlySeries {
    /// Spread the readings over the local hours they overlap.
    ///
    /// A reading's energy is apportioned proportionally to the overlap, and its last
    /// hour receives the remainder, so the total energy is preserved.
    #[instrument(skip_all, fields(n_readings = readings.len()))]
    pub fn try_from_readings(readings: &[IntervalReading], utc_offset: FixedOffset) -> Result<Self> {
        let span = readings
            .iter()
            .map(|reading| reading.interval)
            .reduce(RangeExclusive::union)
            .context("no readings to build the series from")?
            .with_timezone(&utc_offset)
            .try_align_to_hours()?;

        let mut hours = (0..span.len().num_hours())
            .map(|index| {
                let start = span.start + TimeDelta::hours(index);
                HourlyUsage::empty(Interval::new(start, start + TimeDelta::hours(1)))
            })
            .collect_vec();

        for reading in readings {
            let interval = reading.interval.with_timezone(&utc_offset);
            let first_index = usize::try_from((interval.start - span.start).num_hours())?;
            let overlaps = hours
                .iter_mut()
                .skip(first_index)
                .map_while(|hour| {
                    let overlap = hour.interval.intersect(interval)?.len();
                    Some((hour, overlap))
                })
                .collect_vec();
            let n_overlaps = overlaps.len();
            let mut remainder = reading.energy;
            for (index, (hour, overlap)) in overlaps.into_iter().enumerate() {
                let share = if index + 1 == n_overlaps {
                    remainder
                } else {
                    reading.energy * (overlap.as_seconds_f64() / reading.duration().as_seconds_f64())
                };
                remainder -= share;
                hour.energy += share;
                hour.coverage += overlap;
            }
        }

        let this = Self(hours);
        info!(n_hours = this.len(), n_gap_hours = this.n_gap_hours(), "built");
        Ok(this)
    }

    /// Covered span, from the first hour start to the last hour end.
    pub fn interval(&self) -> Option<Interval> {
        Some(Interval::new(self.first()?.interval.start, self.last()?.interval.end))
    }

    #[must_use]
    pub fn n_gap_hours(&self) -> usize {
        self.iter().filter(|hour| hour.is_gap()).count()
    }

    /// Group the hours by their local calendar day.
    pub fn days(&self) -> impl Iterator<Item = (NaiveDate, &[HourlyUsage])> {
        self.chunk_by(|lhs, rhs| lhs.date() == rhs.date()).map(|hours| (hours[0].date(), hours))
    }

    pub fn daily(&self) -> impl Iterator<Item = DailyUsage> {
        self.days().map(|(date, hours)| DailyUsage::from_hours(date, hours))
    }
}
