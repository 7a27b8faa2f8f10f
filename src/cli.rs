mod budget;

use std::path::PathBuf;

use chrono::{FixedOffset, Offset, Utc};
use clap::Parser;
use itertools::Itertools;

use crate::{
    cli::budget::{BudgetArgs, LocationArgs},
    import::Import,
    prelude::*,
    report::Report,
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    /// ESPI (Green Button) XML exports to combine.
    #[clap(required = true)]
    pub files: Vec<PathBuf>,

    #[clap(flatten)]
    pub budget: BudgetArgs,

    #[clap(flatten)]
    pub location: LocationArgs,

    /// UTC offset for calendar days and hours, like `-05:00`.
    /// Defaults to the offset declared by the exports, or UTC.
    #[clap(long = "utc-offset", env = "UTC_OFFSET", allow_hyphen_values = true)]
    pub utc_offset: Option<FixedOffset>,

    /// Number of trailing days listed in the recent daily usage.
    #[clap(long = "recent-days", env = "RECENT_DAYS", default_value = "5")]
    pub recent_days: usize,

    #[clap(long, value_enum, default_value = "text")]
    pub format: Format,

    /// Log debug messages.
    #[clap(long, short)]
    pub verbose: bool,
}

#[derive(Copy, Clone, Debug, clap::ValueEnum)]
pub enum Format {
    /// Human-readable tables.
    Text,

    /// One JSON object per meter.
    Json,
}

impl Args {
    pub fn run(self) -> Result {
        let budget = self.budget.try_into_config()?;
        let location = self.location.try_into_location()?;

        let import = Import::try_from_paths(&self.files)?;
        let utc_offset = self.utc_offset.or(import.utc_offset).unwrap_or_else(|| Utc.fix());
        info!(%utc_offset, n_meters = import.meters.len(), "analyzing…");

        let reports: Vec<Report> = import
            .meters
            .iter()
            .map(|meter| {
                Report::builder()
                    .meter(meter)
                    .import(&import)
                    .utc_offset(utc_offset)
                    .budget(budget)
                    .location(location)
                    .n_recent_days(self.recent_days)
                    .build()
            })
            .try_collect()?;

        match self.format {
            Format::Text => {
                for report in &reports {
                    println!("{report}");
                }
            }
            Format::Json => {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            }
        }
        Ok(())
    }
}
