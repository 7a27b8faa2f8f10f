//! Battery and location arguments.

use clap::Parser;

use crate::{
    core::{budget::BudgetConfig, daylight::Location},
    error::AnalysisError,
    prelude::*,
    quantity::{energy::KilowattHours, time::Hours},
};

#[must_use]
#[derive(Parser)]
pub struct BudgetArgs {
    /// Usable battery capacity in kilowatt-hours.
    #[clap(long = "battery-size-kwh", env = "BATTERY_SIZE_KWH", allow_hyphen_values = true)]
    pub battery_capacity: KilowattHours,

    /// How long the battery must carry the house, in hours.
    #[clap(long = "battery-runtime-hours", env = "BATTERY_RUNTIME_HOURS", allow_hyphen_values = true)]
    pub runtime: Hours,
}

impl BudgetArgs {
    pub fn try_into_config(self) -> Result<BudgetConfig, AnalysisError> {
        BudgetConfig::builder().battery_capacity(self.battery_capacity).runtime(self.runtime).build()
    }
}

#[must_use]
#[derive(Parser)]
pub struct LocationArgs {
    /// Latitude in degrees for the daylight hours, positive to the north.
    #[clap(long, env = "LATITUDE", default_value_t = Location::ANN_ARBOR.latitude, allow_hyphen_values = true)]
    pub latitude: f64,
}

impl LocationArgs {
    pub fn try_into_location(self) -> Result<Location> {
        Location::try_new(self.latitude)
    }
}
