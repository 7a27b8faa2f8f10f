use roxmltree::Node;

use crate::{
    espi::{ESPI, espi_child},
    prelude::*,
};

/// Unit of measure code for watt-hours.
const WATT_HOURS: u32 = 72;

/// The parts of `espi:ReadingType` needed to descale the interval values.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct ReadingType {
    /// Values are multiplied by `10^power_of_ten_multiplier`.
    pub power_of_ten_multiplier: i32,

    pub unit_of_measure: Option<u32>,
}

impl ReadingType {
    /// Find the reading type of the document, first one wins.
    pub fn find_in(root: Node) -> Self {
        let mut reading_types = root
            .descendants()
            .filter(|node| node.has_tag_name((ESPI, "ReadingType")))
            .map(Self::from_node);
        let Some(reading_type) = reading_types.next() else {
            debug!("no reading type, assuming plain watt-hours");
            return Self::default();
        };
        if reading_types.any(|other| other != reading_type) {
            warn!(?reading_type, "conflicting reading types, using the first one");
        }
        if reading_type.unit_of_measure.is_some_and(|uom| uom != WATT_HOURS) {
            warn!(uom = ?reading_type.unit_of_measure, "unit of measure is not watt-hours");
        }
        reading_type
    }

    fn from_node(node: Node) -> Self {
        let integer = |name| -> Option<i32> { espi_child(node, name)?.text()?.trim().parse().ok() };
        Self {
            power_of_ten_multiplier: integer("powerOfTenMultiplier").unwrap_or_default(),
            unit_of_measure: integer("uom").and_then(|uom| u32::try_from(uom).ok()),
        }
    }
}
