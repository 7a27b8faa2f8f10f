use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    core::{
        budget::BudgetConfig,
        daylight::Location,
        series::{HourlySeries, HourlyUsage},
    },
    ops::interval::Interval,
    prelude::*,
    quantity::{energy::KilowattHours, power::Watts, time::Hours},
};

/// Day on which the worst-case window drains more than the battery holds.
#[must_use]
#[derive(Copy, Clone, Debug, Serialize)]
pub struct ShortfallPeriod {
    pub date: NaiveDate,

    /// Worst-case window within the day.
    pub window: Interval,

    pub window_energy: KilowattHours,

    /// Usage over the window beyond the battery capacity, always positive.
    pub excess: KilowattHours,

    /// Average power deficit over the runtime.
    pub watt_shortfall: Watts,

    pub daylight: Hours,

    /// Average solar power needed over the daylight hours to cover the excess.
    pub solar_shortfall: Option<Watts>,
}

#[must_use]
#[derive(Clone, Debug, Serialize)]
pub struct ShortfallAnalysis {
    /// Calendar days in the series, partial ones included.
    pub n_days: usize,

    /// Days with fewer covered hours than the runtime, never counted as exceeding.
    pub n_partial_days: usize,

    /// Exceeding days, by date ascending.
    pub periods: Vec<ShortfallPeriod>,
}

impl ShortfallAnalysis {
    /// Find the worst window of each calendar day and compare it with the battery.
    ///
    /// The window starts on an hour, lasts exactly the runtime and never crosses midnight.
    /// Gap hours inside a window count as zero usage.
    #[instrument(skip_all, fields(battery = %budget.battery_capacity, runtime = %budget.runtime))]
    pub fn analyze(series: &HourlySeries, budget: BudgetConfig, location: Location) -> Self {
        let window_len = budget.window_len();
        let mut this = Self { n_days: 0, n_partial_days: 0, periods: Vec::new() };

        for (date, hours) in series.days() {
            this.n_days += 1;
            let n_covered_hours = hours.iter().filter(|hour| !hour.is_gap()).count();
            let worst = if n_covered_hours < window_len { None } else { worst_window(hours, budget) };
            let Some((window, window_energy)) = worst else {
                debug!(%date, n_hours = hours.len(), n_covered_hours, "partial day");
                this.n_partial_days += 1;
                continue;
            };
            if window_energy <= budget.battery_capacity {
                continue;
            }
            let excess = window_energy - budget.battery_capacity;
            let daylight = location.daylight_hours(date);
            let period = ShortfallPeriod {
                date,
                window,
                window_energy,
                excess,
                watt_shortfall: Watts::from(excess / budget.runtime),
                daylight,
                solar_shortfall: (daylight > Hours::ZERO).then(|| Watts::from(excess / daylight)),
            };
            debug!(%date, ?window, %excess, "exceeding");
            this.periods.push(period);
        }

        info!(
            n_days = this.n_days,
            n_partial_days = this.n_partial_days,
            n_exceeding = this.periods.len(),
            "analyzed",
        );
        this
    }

    #[must_use]
    pub fn n_exceeding(&self) -> usize {
        self.periods.len()
    }

    #[must_use]
    pub fn n_within(&self) -> usize {
        self.n_days - self.periods.len()
    }
}

/// The earliest runtime window with the highest usage.
///
/// Only the runtime's share of the window's last hour is counted.
fn worst_window(hours: &[HourlyUsage], budget: BudgetConfig) -> Option<(Interval, KilowattHours)> {
    let len = budget.window_len();
    let last_hour_share = budget.last_hour_share();
    hours
        .windows(len)
        .map(|window| {
            let energy = window[..len - 1].iter().map(|hour| hour.energy).sum::<KilowattHours>()
                + window[len - 1].energy * last_hour_share;
            let start = window[0].interval.start;
            (Interval::new(start, start + budget.runtime_delta()), energy)
        })
        .reduce(|worst, candidate| if candidate.1 > worst.1 { candidate } else { worst })
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::{FixedOffset, Timelike, Utc};
    use itertools::Itertools;

    use super::*;
    use crate::espi::IntervalReading;

    /// 2024-06-01 00:00:00 UTC.
    const START: i64 = 1_717_200_000;

    fn series(first_hour: i64, usage: &[f64]) -> HourlySeries {
        let readings = usage
            .iter()
            .zip(first_hour..)
            .map(|(kwh, hour)| IntervalReading {
                interval: Interval::<Utc>::try_from_unix(START + hour * 3600, 3600).unwrap(),
                energy: KilowattHours::from(*kwh),
            })
            .collect_vec();
        HourlySeries::try_from_readings(&readings, FixedOffset::east_opt(0).unwrap()).unwrap()
    }

    /// Series from midnight of the first day, `None` is an hour without readings.
    fn sparse_series(usage: &[Option<f64>]) -> HourlySeries {
        let readings = usage
            .iter()
            .zip(0..)
            .filter_map(|(kwh, hour)| {
                Some(IntervalReading {
                    interval: Interval::<Utc>::try_from_unix(START + hour * 3600, 3600).unwrap(),
                    energy: KilowattHours::from((*kwh)?),
                })
            })
            .collect_vec();
        HourlySeries::try_from_readings(&readings, FixedOffset::east_opt(0).unwrap()).unwrap()
    }

    fn budget(battery_capacity: f64, runtime: f64) -> BudgetConfig {
        BudgetConfig::builder()
            .battery_capacity(KilowattHours::from(battery_capacity))
            .runtime(Hours::from(runtime))
            .build()
            .unwrap()
    }

    fn two_days() -> Vec<f64> {
        let mut usage = vec![0.5; 48];
        usage[10] = 13.0;
        usage[11] = 14.0;
        usage[12] = 13.0;
        usage
    }

    #[test]
    fn test_exceeding_day() {
        let analysis =
            ShortfallAnalysis::analyze(&series(0, &two_days()), budget(30.0, 3.0), Location::default());
        assert_eq!(analysis.n_days, 2);
        assert_eq!(analysis.n_partial_days, 0);
        assert_eq!(analysis.n_exceeding(), 1);
        assert_eq!(analysis.n_within(), 1);

        let period = analysis.periods[0];
        assert_eq!(period.date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(period.window.start.hour(), 10);
        assert_eq!(period.window.end.hour(), 13);
        assert_abs_diff_eq!(period.window_energy.0, 40.0, epsilon = 1e-9);
        assert_abs_diff_eq!(period.excess.0, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(period.watt_shortfall.0, 10_000.0 / 3.0, epsilon = 1e-6);
        assert!(period.daylight > Hours::from(14.0));
        let solar_shortfall = period.solar_shortfall.unwrap();
        assert_abs_diff_eq!(solar_shortfall.0, 10_000.0 / period.daylight.0, epsilon = 1e-6);
    }

    #[test]
    fn test_large_battery_has_no_exceeding_days() {
        let analysis =
            ShortfallAnalysis::analyze(&series(0, &two_days()), budget(40.0, 3.0), Location::default());
        assert_eq!(analysis.n_exceeding(), 0);
        assert_eq!(analysis.n_within(), 2);
    }

    #[test]
    fn test_partial_day_is_counted_but_not_exceeding() {
        // 22:00 and 23:00 of the first day are heavy, but the day is shorter than the window.
        let usage = [20.0, 20.0, 0.1, 0.1, 0.1, 0.1];
        let analysis = ShortfallAnalysis::analyze(&series(22, &usage), budget(5.0, 3.0), Location::default());
        assert_eq!(analysis.n_days, 2);
        assert_eq!(analysis.n_partial_days, 1);
        assert_eq!(analysis.n_exceeding(), 0);
    }

    #[test]
    fn test_sparse_day_is_partial() {
        // The second day only has 10:00 and 11:00, both heavy, and gaps elsewhere.
        let mut usage = vec![Some(0.5); 72];
        usage[24..48].fill(None);
        usage[34] = Some(20.0);
        usage[35] = Some(20.0);
        let analysis =
            ShortfallAnalysis::analyze(&sparse_series(&usage), budget(30.0, 3.0), Location::default());
        assert_eq!(analysis.n_days, 3);
        assert_eq!(analysis.n_partial_days, 1);
        assert_eq!(analysis.n_exceeding(), 0);
        assert_eq!(analysis.n_within(), 3);
    }

    #[test]
    fn test_gap_hours_count_as_zero_in_covered_day() {
        // Three covered hours are enough, and the gap between them adds nothing.
        let mut usage = vec![None; 24];
        usage[10] = Some(20.0);
        usage[12] = Some(20.0);
        usage[20] = Some(1.0);
        let analysis =
            ShortfallAnalysis::analyze(&sparse_series(&usage), budget(30.0, 3.0), Location::default());
        assert_eq!(analysis.n_partial_days, 0);
        assert_eq!(analysis.n_exceeding(), 1);
        assert_eq!(analysis.periods[0].window.start.hour(), 10);
        assert_abs_diff_eq!(analysis.periods[0].window_energy.0, 40.0, epsilon = 1e-9);
    }

    #[test]
    fn test_fractional_runtime_prorates_last_hour() {
        let analysis =
            ShortfallAnalysis::analyze(&series(0, &[4.0; 24]), budget(9.0, 2.5), Location::default());
        let period = analysis.periods[0];
        assert_eq!(period.window.start.hour(), 0);
        assert_eq!((period.window.end.hour(), period.window.end.minute()), (2, 30));
        assert_abs_diff_eq!(period.window_energy.0, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(period.excess.0, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(period.watt_shortfall.0, 400.0, epsilon = 1e-6);
    }

    #[test]
    fn test_window_does_not_cross_midnight() {
        let mut usage = vec![0.0; 48];
        usage[23] = 10.0;
        usage[24] = 10.0;
        let analysis =
            ShortfallAnalysis::analyze(&series(0, &usage), budget(15.0, 2.0), Location::default());
        assert_eq!(analysis.n_exceeding(), 0);
    }

    #[test]
    fn test_ties_resolve_to_earliest_window() {
        let mut usage = vec![0.0; 24];
        usage[3] = 5.0;
        usage[15] = 5.0;
        let analysis =
            ShortfallAnalysis::analyze(&series(0, &usage), budget(1.0, 1.0), Location::default());
        assert_eq!(analysis.periods[0].window.start.hour(), 3);
    }

    #[test]
    fn test_polar_night_has_no_solar_shortfall() {
        let usage = vec![1.0; 24];
        let analysis = ShortfallAnalysis::analyze(
            &series(0, &usage),
            budget(0.5, 1.0),
            Location::try_new(-80.0).unwrap(),
        );
        assert!(analysis.periods[0].solar_shortfall.is_none());
    }
}
