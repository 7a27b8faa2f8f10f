use chrono::{TimeDelta, Utc};
use roxmltree::Node;

use crate::{
    error::SchemaError,
    espi::{ReadingType, espi_child},
    ops::interval::Interval,
    quantity::energy::KilowattHours,
};

/// Metered energy over a time span, immutable once parsed.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntervalReading {
    pub interval: Interval<Utc>,

    /// Descaled energy, never negative.
    pub energy: KilowattHours,
}

impl IntervalReading {
    /// Map `espi:IntervalReading` onto a typed reading.
    ///
    /// Start, duration, and value are all required. Export (negative) readings
    /// and empty intervals are rejected.
    pub fn try_from_node(node: Node, reading_type: ReadingType) -> Result<Self, SchemaError> {
        let time_period =
            espi_child(node, "timePeriod").ok_or(SchemaError::MissingElement("timePeriod"))?;
        let start = integer(time_period, "start")?;
        let duration = integer(time_period, "duration")?;
        let value = integer(node, "value")?;

        if duration <= 0 {
            return Err(SchemaError::NonPositiveDuration(duration));
        }
        if value < 0 {
            return Err(SchemaError::NegativeValue(value));
        }
        let interval = Interval::<Utc>::try_from_unix(start, duration)
            .ok_or(SchemaError::TimestampOutOfRange(start))?;
        let energy =
            KilowattHours::from_scaled_watt_hours(value, reading_type.power_of_ten_multiplier);
        Ok(Self { interval, energy })
    }

    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        self.interval.len()
    }
}

fn integer(node: Node, element: &'static str) -> Result<i64, SchemaError> {
    let text = espi_child(node, element)
        .ok_or(SchemaError::MissingElement(element))?
        .text()
        .unwrap_or_default()
        .trim();
    text.parse().map_err(|_| SchemaError::InvalidNumber { element, text: text.to_owned() })
}
