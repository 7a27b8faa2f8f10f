mod aggregate;
mod hourly;
mod profile;

pub use self::{
    aggregate::{Aggregate, Percentiles},
    hourly::{DailyUsage, HourlySeries, HourlyUsage},
    profile::Profile,
};
