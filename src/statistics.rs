use itertools::Itertools;
use serde::Serialize;

use crate::{
    core::{
        budget::BudgetConfig,
        series::{Aggregate, DailyUsage, HourlySeries, HourlyUsage, Percentiles},
        shortfall::ShortfallAnalysis,
    },
    fmt::Percentage,
    prelude::*,
    quantity::{energy::KilowattHours, power::{Kilowatts, Watts}},
};

/// Peak and average usage, gap hours and empty days excluded.
#[must_use]
#[derive(Copy, Clone, Debug, Serialize)]
pub struct UsageStatistics {
    pub peak_hour: HourlyUsage,
    pub average_hourly: Kilowatts,
    pub peak_day: DailyUsage,
    pub average_daily: KilowattHours,
    pub n_hours: usize,
    pub n_gap_hours: usize,
    pub n_days: usize,
}

impl UsageStatistics {
    pub fn try_from_series(series: &HourlySeries) -> Result<Self> {
        let covered = series.iter().filter(|hour| !hour.is_gap()).collect_vec();
        let peak_hour = **covered
            .iter()
            .reduce(|peak, hour| if hour.energy > peak.energy { hour } else { peak })
            .context("the series has no covered hours")?;
        let average_hourly =
            covered.iter().map(|hour| hour.power()).mean().context("the series has no covered hours")?;

        let days = series.daily().filter(DailyUsage::has_data).collect_vec();
        let peak_day = *days
            .iter()
            .reduce(|peak, day| if day.energy > peak.energy { day } else { peak })
            .context("the series has no covered days")?;
        let average_daily =
            days.iter().map(|day| day.energy).mean().context("the series has no covered days")?;

        Ok(Self {
            peak_hour,
            average_hourly,
            peak_day,
            average_daily,
            n_hours: series.len(),
            n_gap_hours: series.len() - covered.len(),
            n_days: series.days().count(),
        })
    }
}

/// How often the battery would have fallen short.
#[must_use]
#[derive(Copy, Clone, Debug, Serialize)]
pub struct BudgetSummary {
    pub budget: BudgetConfig,

    /// Calendar days considered, partial ones included.
    pub n_days: usize,

    pub n_partial_days: usize,
    pub n_within: usize,
    pub within: Percentage,
    pub n_exceeding: usize,
    pub exceeding: Percentage,

    /// Average power deficit over the runtime, across the exceeding days.
    pub watt_shortfall: Option<Percentiles<Watts>>,

    /// Solar power needed over the daylight, across the exceeding days with daylight.
    pub solar_shortfall: Option<Percentiles<Watts>>,
}

impl BudgetSummary {
    pub fn new(budget: BudgetConfig, analysis: &ShortfallAnalysis) -> Self {
        let watt_shortfall = analysis
            .periods
            .iter()
            .map(|period| period.watt_shortfall.0)
            .percentiles()
            .map(|percentiles| percentiles.map(Watts));
        let solar_shortfall = analysis
            .periods
            .iter()
            .filter_map(|period| period.solar_shortfall)
            .map(|watts| watts.0)
            .percentiles()
            .map(|percentiles| percentiles.map(Watts));
        Self {
            budget,
            n_days: analysis.n_days,
            n_partial_days: analysis.n_partial_days,
            n_within: analysis.n_within(),
            within: Percentage::of(analysis.n_within(), analysis.n_days),
            n_exceeding: analysis.n_exceeding(),
            exceeding: Percentage::of(analysis.n_exceeding(), analysis.n_days),
            watt_shortfall,
            solar_shortfall,
        }
    }
}
