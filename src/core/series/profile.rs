use std::array;

use chrono::{Datelike, Timelike};

use crate::core::series::{Aggregate, Percentiles};

impl<T> Profile for T where T: ?Sized {}

pub trait Profile {
    /// Percentile breakdown of the values per hour of the day.
    fn hourly_percentiles<K>(self) -> [Option<Percentiles<f64>>; 24]
    where
        Self: Sized + Iterator<Item = (K, f64)>,
        K: Timelike,
    {
        group(self.map(|(timestamp, value)| (timestamp.hour() as usize, value)))
    }

    /// Percentile breakdown of the values per day of the week, Monday first.
    fn weekday_percentiles<K>(self) -> [Option<Percentiles<f64>>; 7]
    where
        Self: Sized + Iterator<Item = (K, f64)>,
        K: Datelike,
    {
        group(self.map(|(date, value)| (date.weekday().num_days_from_monday() as usize, value)))
    }
}

fn group<const N: usize>(
    values: impl Iterator<Item = (usize, f64)>,
) -> [Option<Percentiles<f64>>; N] {
    let mut groups: [Vec<f64>; N] = array::from_fn(|_| Vec::new());
    for (index, value) in values {
        groups[index].push(value);
    }
    groups.map(|group| group.percentiles())
}
