use std::{
    fmt::{Display, Formatter},
    iter,
};

use bon::bon;
use chrono::{DateTime, FixedOffset, TimeZone, Weekday};
use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};
use itertools::Itertools;
use serde::Serialize;

use crate::{
    core::{
        budget::BudgetConfig,
        daylight::Location,
        series::{DailyUsage, HourlySeries, Percentiles, Profile},
        shortfall::{ShortfallAnalysis, ShortfallPeriod},
    },
    espi::MeterId,
    import::{FileCoverage, FileFailure, Import, Meter},
    ops::interval::Interval,
    prelude::*,
    quantity::{energy::KilowattHours, power::Watts},
    statistics::{BudgetSummary, UsageStatistics},
};

/// Everything known about one meter after the analysis.
#[must_use]
#[derive(Serialize)]
pub struct Report {
    pub meter_id: MeterId,
    pub title: Option<String>,
    pub utc_offset: String,
    pub location: Location,

    /// Span of the hourly series.
    pub coverage: Interval,

    pub files: Vec<FileCoverage>,
    pub failures: Vec<FileFailure>,

    /// Entries of this meter that failed the schema mapping.
    pub n_skipped: usize,

    pub n_duplicates: usize,
    pub n_superseded: usize,

    pub usage: UsageStatistics,
    pub recent_days: Vec<DailyUsage>,

    /// Usage per local hour of the day, gap hours excluded.
    pub hourly_profile: [Option<Percentiles<KilowattHours>>; 24],

    /// Daily totals per day of the week, Monday first, days without data excluded.
    pub weekday_profile: [Option<Percentiles<KilowattHours>>; 7],

    pub budget: BudgetSummary,
    pub periods: Vec<ShortfallPeriod>,

    #[serde(skip)]
    local_offset: FixedOffset,
}

#[bon]
impl Report {
    #[builder]
    pub fn new(
        meter: &Meter,
        import: &Import,
        utc_offset: FixedOffset,
        budget: BudgetConfig,
        location: Location,
        #[builder(default = 5)] n_recent_days: usize,
    ) -> Result<Self> {
        let series = HourlySeries::try_from_readings(&meter.readings, utc_offset)
            .with_context(|| format!("failed to build the hourly series of meter `{}`", meter.id))?;
        let coverage = series.interval().context("the hourly series is empty")?;
        let usage = UsageStatistics::try_from_series(&series)?;

        let daily = series.daily().collect_vec();
        let recent_days = daily[daily.len().saturating_sub(n_recent_days)..].to_vec();
        let hourly_profile = series
            .iter()
            .filter(|hour| !hour.is_gap())
            .map(|hour| (hour.interval.start, hour.energy.0))
            .hourly_percentiles()
            .map(|percentiles| percentiles.map(|percentiles| percentiles.map(KilowattHours::from)));
        let weekday_profile = daily
            .iter()
            .filter(|day| day.has_data())
            .map(|day| (day.date, day.energy.0))
            .weekday_percentiles()
            .map(|percentiles| percentiles.map(|percentiles| percentiles.map(KilowattHours::from)));

        let analysis = ShortfallAnalysis::analyze(&series, budget, location);
        Ok(Self {
            meter_id: meter.id.clone(),
            title: meter.title.clone(),
            utc_offset: utc_offset.to_string(),
            location,
            coverage,
            files: import.files.clone(),
            failures: import.failures.clone(),
            n_skipped: meter.n_skipped,
            n_duplicates: meter.n_duplicates,
            n_superseded: meter.n_superseded,
            usage,
            recent_days,
            hourly_profile,
            weekday_profile,
            budget: BudgetSummary::new(budget, &analysis),
            periods: analysis.periods,
            local_offset: utc_offset,
        })
    }
}

impl Report {
    fn local<Tz: TimeZone>(&self, timestamp: &DateTime<Tz>) -> String {
        timestamp.with_timezone(&self.local_offset).format("%Y-%m-%d %H:%M").to_string()
    }

    fn files_table(&self) -> Table {
        let mut table = new_table();
        table.set_header(vec![
            Cell::new("File"),
            Cell::new("From"),
            Cell::new("To"),
            Cell::new("Readings").set_alignment(CellAlignment::Right),
            Cell::new("Skipped").set_alignment(CellAlignment::Right),
        ]);
        for file in &self.files {
            let (from, to) = file.interval.map_or_else(
                || ("n/a".to_owned(), "n/a".to_owned()),
                |interval| (self.local(&interval.start), self.local(&interval.end)),
            );
            table.add_row(vec![
                Cell::new(file.path.display()),
                Cell::new(from),
                Cell::new(to),
                Cell::new(file.n_readings).set_alignment(CellAlignment::Right),
                Cell::new(file.n_skipped)
                    .set_alignment(CellAlignment::Right)
                    .fg(if file.n_skipped == 0 { Color::Reset } else { Color::DarkYellow }),
            ]);
        }
        for failure in &self.failures {
            table.add_row(vec![
                Cell::new(failure.path.display()),
                Cell::new(&failure.reason).fg(Color::Red),
                Cell::new(""),
                Cell::new("0").set_alignment(CellAlignment::Right),
                Cell::new("n/a").set_alignment(CellAlignment::Right),
            ]);
        }
        table
    }

    fn usage_table(&self) -> Table {
        let mut table = new_table();
        table
            .set_header(vec![
                Cell::new(""),
                Cell::new("Hourly").set_alignment(CellAlignment::Right),
                Cell::new("Daily").set_alignment(CellAlignment::Right),
            ])
            .add_row(vec![
                Cell::new("Peak").add_attribute(Attribute::Bold),
                Cell::new(self.usage.peak_hour.power()).set_alignment(CellAlignment::Right),
                Cell::new(self.usage.peak_day.energy).set_alignment(CellAlignment::Right),
            ])
            .add_row(vec![
                Cell::new("Peak at"),
                Cell::new(self.local(&self.usage.peak_hour.interval.start))
                    .set_alignment(CellAlignment::Right)
                    .add_attribute(Attribute::Dim),
                Cell::new(self.usage.peak_day.date)
                    .set_alignment(CellAlignment::Right)
                    .add_attribute(Attribute::Dim),
            ])
            .add_row(vec![
                Cell::new("Average").add_attribute(Attribute::Bold),
                Cell::new(self.usage.average_hourly).set_alignment(CellAlignment::Right),
                Cell::new(self.usage.average_daily).set_alignment(CellAlignment::Right),
            ]);
        table
    }

    fn recent_days_table(&self) -> Table {
        let mut table = new_table();
        table.set_header(vec![
            Cell::new("Date"),
            Cell::new("Usage").set_alignment(CellAlignment::Right),
            Cell::new("Hours").set_alignment(CellAlignment::Right),
            Cell::new("Gaps").set_alignment(CellAlignment::Right),
        ]);
        for day in &self.recent_days {
            table.add_row(vec![
                Cell::new(day.date),
                Cell::new(day.energy).set_alignment(CellAlignment::Right),
                Cell::new(day.n_hours).set_alignment(CellAlignment::Right),
                Cell::new(day.n_gap_hours)
                    .set_alignment(CellAlignment::Right)
                    .fg(if day.n_gap_hours == 0 { Color::Reset } else { Color::DarkYellow }),
            ]);
        }
        table
    }

    fn hourly_profile_table(&self) -> Table {
        let mut table = profile_table("Hour");
        for (hour, percentiles) in self.hourly_profile.iter().enumerate() {
            table.add_row(profile_row(format!("{hour:02}:00"), percentiles.as_ref()));
        }
        table
    }

    fn weekday_profile_table(&self) -> Table {
        let mut table = profile_table("Day");
        let weekdays = iter::successors(Some(Weekday::Mon), |weekday| Some(weekday.succ()));
        for (weekday, percentiles) in weekdays.zip(&self.weekday_profile) {
            table.add_row(profile_row(weekday.to_string(), percentiles.as_ref()));
        }
        table
    }

    fn periods_table(&self) -> Table {
        let mut table = new_table();
        table.set_header(vec![
            Cell::new("Date"),
            Cell::new("Window"),
            Cell::new("Usage").set_alignment(CellAlignment::Right),
            Cell::new("Excess").set_alignment(CellAlignment::Right),
            Cell::new("Shortfall").set_alignment(CellAlignment::Right),
            Cell::new("Daylight").set_alignment(CellAlignment::Right),
            Cell::new("Solar").set_alignment(CellAlignment::Right),
        ]);
        for period in &self.periods {
            table.add_row(vec![
                Cell::new(period.date),
                Cell::new(format!(
                    "{}-{}",
                    period.window.start.format("%H:%M"),
                    period.window.end.format("%H:%M"),
                ))
                .add_attribute(Attribute::Dim),
                Cell::new(period.window_energy).set_alignment(CellAlignment::Right),
                Cell::new(period.excess).set_alignment(CellAlignment::Right).fg(Color::Red),
                Cell::new(period.watt_shortfall).set_alignment(CellAlignment::Right),
                Cell::new(period.daylight).set_alignment(CellAlignment::Right),
                option_cell(period.solar_shortfall),
            ]);
        }
        table
    }

    fn budget_table(&self) -> Table {
        let summary = &self.budget;
        let mut table = new_table();
        table
            .set_header(vec![
                Cell::new("Days").set_alignment(CellAlignment::Right),
                Cell::new("Within").set_alignment(CellAlignment::Right),
                Cell::new("Exceeding").set_alignment(CellAlignment::Right),
                Cell::new("Partial").set_alignment(CellAlignment::Right),
            ])
            .add_row(vec![
                Cell::new(summary.n_days).set_alignment(CellAlignment::Right),
                Cell::new(format!("{} ({})", summary.n_within, summary.within))
                    .set_alignment(CellAlignment::Right)
                    .fg(Color::Green),
                Cell::new(format!("{} ({})", summary.n_exceeding, summary.exceeding))
                    .set_alignment(CellAlignment::Right)
                    .fg(if summary.n_exceeding == 0 { Color::Reset } else { Color::Red }),
                Cell::new(summary.n_partial_days)
                    .set_alignment(CellAlignment::Right)
                    .add_attribute(Attribute::Dim),
            ]);
        table
    }

    fn shortfall_table(
        watt_shortfall: &Percentiles<Watts>,
        solar_shortfall: Option<&Percentiles<Watts>>,
    ) -> Table {
        let rows: [(&str, fn(&Percentiles<Watts>) -> Watts); 8] = [
            ("Minimum", |p| p.min),
            ("25th %", |p| p.p25),
            ("Average", |p| p.mean),
            ("Median", |p| p.median),
            ("75th %", |p| p.p75),
            ("90th %", |p| p.p90),
            ("95th %", |p| p.p95),
            ("Peak", |p| p.max),
        ];
        let mut table = new_table();
        table.set_header(vec![
            Cell::new(""),
            Cell::new("Over runtime").set_alignment(CellAlignment::Right),
            Cell::new("Over daylight").set_alignment(CellAlignment::Right),
        ]);
        for (label, get) in rows {
            table.add_row(vec![
                Cell::new(label).add_attribute(Attribute::Bold),
                Cell::new(get(watt_shortfall)).set_alignment(CellAlignment::Right),
                option_cell(solar_shortfall.map(get)),
            ]);
        }
        table
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.title {
            Some(title) => writeln!(f, "Electric usage summary for {title} (meter {})", self.meter_id)?,
            None => writeln!(f, "Electric usage summary for meter {}", self.meter_id)?,
        }
        writeln!(f, "UTC offset: {}", self.utc_offset)?;

        writeln!(f, "\nFile coverage:")?;
        writeln!(f, "{}", self.files_table())?;
        writeln!(
            f,
            "Skipped readings: {}, replaced duplicates: {}, superseded coarser readings: {}",
            self.n_skipped, self.n_duplicates, self.n_superseded,
        )?;

        writeln!(f, "\nUsage:")?;
        writeln!(f, "{}", self.usage_table())?;

        writeln!(f, "\nPeriod coverage:")?;
        writeln!(
            f,
            "{} days ({} hours, {} gap hours)",
            self.usage.n_days, self.usage.n_hours, self.usage.n_gap_hours,
        )?;
        writeln!(f, "From: {}", self.local(&self.coverage.start))?;
        writeln!(f, "To:   {}", self.local(&self.coverage.end))?;

        writeln!(f, "\nRecent daily usage:")?;
        writeln!(f, "{}", self.recent_days_table())?;

        writeln!(f, "\nHourly usage profile:")?;
        writeln!(f, "{}", self.hourly_profile_table())?;

        writeln!(f, "\nDaily usage by day of the week:")?;
        writeln!(f, "{}", self.weekday_profile_table())?;

        let budget = self.budget.budget;
        if self.periods.is_empty() {
            writeln!(
                f,
                "\nNo periods found exceeding {} over {}",
                budget.battery_capacity, budget.runtime,
            )?;
        } else {
            writeln!(f, "\nPeriods exceeding {} over {}:", budget.battery_capacity, budget.runtime)?;
            writeln!(f, "{}", self.periods_table())?;
        }

        writeln!(
            f,
            "\nBudget summary: {} over {} sustains {} (latitude {:.4}):",
            budget.battery_capacity,
            budget.runtime,
            budget.sustained_power(),
            self.location.latitude,
        )?;
        writeln!(f, "{}", self.budget_table())?;
        if let Some(watt_shortfall) = &self.budget.watt_shortfall {
            writeln!(f, "\nWatt shortfall statistics:")?;
            writeln!(
                f,
                "{}",
                Self::shortfall_table(watt_shortfall, self.budget.solar_shortfall.as_ref()),
            )?;
        }
        Ok(())
    }
}

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table
}

const PROFILE_COLUMNS: [(&str, fn(&Percentiles<KilowattHours>) -> KilowattHours); 7] = [
    ("Minimum", |p| p.min),
    ("25th %", |p| p.p25),
    ("Median", |p| p.median),
    ("75th %", |p| p.p75),
    ("90th %", |p| p.p90),
    ("Average", |p| p.mean),
    ("Peak", |p| p.max),
];

fn profile_table(label: &str) -> Table {
    let mut table = new_table();
    table.set_header(
        iter::once(Cell::new(label))
            .chain(
                PROFILE_COLUMNS
                    .iter()
                    .map(|(header, _)| Cell::new(header).set_alignment(CellAlignment::Right)),
            )
            .collect_vec(),
    );
    table
}

fn profile_row(label: String, percentiles: Option<&Percentiles<KilowattHours>>) -> Vec<Cell> {
    iter::once(Cell::new(label))
        .chain(PROFILE_COLUMNS.iter().map(|(_, get)| option_cell(percentiles.map(get))))
        .collect()
}

fn option_cell<T: Display>(value: Option<T>) -> Cell {
    value.map(Cell::new).unwrap_or_else(|| Cell::new("n/a")).set_alignment(CellAlignment::Right)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    use super::*;
    use crate::{
        espi::{
            Export,
            fixtures::{Feed, hourly, reading},
        },
        quantity::time::Hours,
    };

    /// 2024-01-01 00:00:00 UTC.
    const START: i64 = 1_704_067_200;

    fn import() -> Import {
        let mut values = vec![500; 48];
        values[10] = 13_000;
        values[11] = 14_000;
        values[12] = 13_000;
        let feed = Feed::new("42").title("Home").block(&hourly(START, &values));
        let broken = "<feed xmlns=\"http://www.w3.org/2005/Atom\"><entry>";
        Import::try_merge(vec![
            ("usage.xml".into(), Export::try_parse(&feed.to_xml())),
            ("broken.xml".into(), Export::try_parse(broken)),
        ])
        .unwrap()
    }

    fn report(import: &Import, battery_capacity: f64) -> Report {
        let budget = BudgetConfig::builder()
            .battery_capacity(KilowattHours::from(battery_capacity))
            .runtime(Hours::from(3.0))
            .build()
            .unwrap();
        Report::builder()
            .meter(&import.meters[0])
            .import(import)
            .utc_offset(FixedOffset::east_opt(0).unwrap())
            .budget(budget)
            .location(Location::default())
            .build()
            .unwrap()
    }

    #[test]
    fn test_exceeding_day_end_to_end() {
        let import = import();
        let report = report(&import, 30.0);

        assert_eq!(report.meter_id, MeterId::from("42"));
        assert_eq!(report.title.as_deref(), Some("Home"));
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.usage.n_hours, 48);
        assert_eq!(report.usage.n_gap_hours, 0);
        assert_eq!(report.recent_days.len(), 2);
        assert_eq!(report.periods.len(), 1);
        assert_eq!(report.periods[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_abs_diff_eq!(report.periods[0].excess.0, 10.0, epsilon = 1e-9);
        assert_eq!(report.budget.n_days, 2);
        assert_eq!(report.budget.n_exceeding, 1);

        let text = report.to_string();
        assert!(text.contains("Electric usage summary for Home (meter 42)"));
        assert!(text.contains("Periods exceeding 30.00 kWh over 3.0 h:"));
        assert!(text.contains("10:00-13:00"));
        assert!(text.contains("10.00 kWh"));
        assert!(text.contains("3333.3 W"));
        assert!(text.contains("broken.xml"));
        assert!(text.contains("Watt shortfall statistics:"));
        assert!(text.contains("sustains 10.00 kW"));
    }

    #[test]
    fn test_no_exceeding_periods() {
        let import = import();
        let text = report(&import, 45.0).to_string();
        assert!(text.contains("No periods found exceeding 45.00 kWh over 3.0 h"));
        assert!(!text.contains("Watt shortfall statistics:"));
    }

    #[test]
    fn test_output_is_deterministic() {
        let lhs = report(&import(), 30.0);
        let rhs = report(&import(), 30.0);
        assert_eq!(lhs.to_string(), rhs.to_string());
        assert_eq!(serde_json::to_string(&lhs).unwrap(), serde_json::to_string(&rhs).unwrap());
    }

    #[test]
    fn test_hourly_profile_and_recent_days() {
        let feed = Feed::new("1").block(
            &(0..72).map(|hour| reading(START + hour * 3600, 3600, 1000 + hour % 24)).collect_vec(),
        );
        let import = Import::try_merge(vec![("a.xml".into(), Export::try_parse(&feed.to_xml()))]).unwrap();
        let budget = BudgetConfig::builder()
            .battery_capacity(KilowattHours::from(10.0))
            .runtime(Hours::from(1.0))
            .build()
            .unwrap();
        let report = Report::builder()
            .meter(&import.meters[0])
            .import(&import)
            .utc_offset(FixedOffset::east_opt(0).unwrap())
            .budget(budget)
            .location(Location::default())
            .n_recent_days(2)
            .build()
            .unwrap();

        assert_eq!(report.recent_days.len(), 2);
        assert_eq!(report.recent_days[1].date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        let midnight = report.hourly_profile[0].unwrap();
        assert_abs_diff_eq!(midnight.min.0, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(midnight.max.0, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(report.hourly_profile[23].unwrap().median.0, 1.023, epsilon = 1e-9);

        // 2024-01-01 is a Monday, so Monday to Wednesday have one day each.
        assert!(report.weekday_profile[..3].iter().all(Option::is_some));
        assert!(report.weekday_profile[3..].iter().all(Option::is_none));
        assert_abs_diff_eq!(report.weekday_profile[0].unwrap().mean.0, 24.276, epsilon = 1e-9);

        let text = report.to_string();
        assert!(text.contains("Hourly usage profile:"));
        assert!(text.contains("Daily usage by day of the week:"));
        assert!(text.contains("Mon"));
    }

    #[test]
    fn test_skipped_entries_of_other_meters_are_not_reported() {
        let broken =
            "<espi:IntervalReading><espi:value>1</espi:value></espi:IntervalReading>".to_owned();
        let xml = Feed::new("1")
            .block(&hourly(START, &[1000; 24]))
            .meter("2")
            .block(&[reading(START, 3600, 1000), broken.clone(), broken])
            .to_xml();
        let import = Import::try_merge(vec![("a.xml".into(), Export::try_parse(&xml))]).unwrap();
        let budget = BudgetConfig::builder()
            .battery_capacity(KilowattHours::from(10.0))
            .runtime(Hours::from(1.0))
            .build()
            .unwrap();
        let report = |meter: &Meter| {
            Report::builder()
                .meter(meter)
                .import(&import)
                .utc_offset(FixedOffset::east_opt(0).unwrap())
                .budget(budget)
                .location(Location::default())
                .build()
                .unwrap()
        };

        let first = report(&import.meters[0]);
        assert_eq!(first.n_skipped, 0);
        assert!(first.to_string().contains("Skipped readings: 0,"));
        assert_eq!(report(&import.meters[1]).n_skipped, 2);
    }
}
