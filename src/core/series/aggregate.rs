use std::ops::{Add, Div};

use itertools::Itertools;
use ordered_float::OrderedFloat;
use serde::Serialize;

/// Percentile breakdown of a sample.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Percentiles<V> {
    pub min: V,
    pub p25: V,
    pub mean: V,
    pub median: V,
    pub p75: V,
    pub p90: V,
    pub p95: V,
    pub max: V,
}

impl<V> Percentiles<V> {
    pub fn map<U>(self, f: impl Fn(V) -> U) -> Percentiles<U> {
        Percentiles {
            min: f(self.min),
            p25: f(self.p25),
            mean: f(self.mean),
            median: f(self.median),
            p75: f(self.p75),
            p90: f(self.p90),
            p95: f(self.p95),
            max: f(self.max),
        }
    }
}

impl<T> Aggregate for T where T: ?Sized {}

pub trait Aggregate {
    #[must_use]
    fn mean<V>(self) -> Option<V>
    where
        Self: Sized + IntoIterator<Item = V>,
        V: Add<Output = V> + Div<f64, Output = V>,
    {
        let (sum, count) = self
            .into_iter()
            .fold((None, 0_u32), |(sum, count), value| {
                (Some(match sum {
                    Some(sum) => sum + value,
                    None => value,
                }), count + 1)
            });
        sum.map(|sum| sum / f64::from(count))
    }

    /// Percentile breakdown with linear interpolation between the closest ranks.
    ///
    /// The `p`-th percentile sits at the fractional rank `(n - 1) × p` of the sorted
    /// sample, like `PERCENTILE.INC` in spreadsheets.
    #[must_use]
    fn percentiles(self) -> Option<Percentiles<f64>>
    where
        Self: Sized + IntoIterator<Item = f64>,
    {
        let sorted = self.into_iter().sorted_unstable_by_key(|value| OrderedFloat(*value)).collect_vec();
        Some(Percentiles {
            min: *sorted.first()?,
            p25: percentile(&sorted, 0.25)?,
            mean: sorted.iter().copied().mean()?,
            median: percentile(&sorted, 0.5)?,
            p75: percentile(&sorted, 0.75)?,
            p90: percentile(&sorted, 0.9)?,
            p95: percentile(&sorted, 0.95)?,
            max: *sorted.last()?,
        })
    }
}

/// Interpolated percentile of an already sorted sample, `p` in `0.0..=1.0`.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let rank = last as f64 * p.clamp(0.0, 1.0);
    let lower = rank.floor() as usize;
    let fraction = rank - rank.floor();
    match sorted.get(lower + 1) {
        Some(upper) => Some(sorted[lower].mul_add(1.0 - fraction, upper * fraction)),
        None => Some(sorted[last]),
    }
}
