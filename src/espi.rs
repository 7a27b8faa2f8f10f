//! ESPI («Green Button») energy usage exports.
//!
//! An export is an Atom feed whose entries carry ESPI resources in `atom:content`:
//! `UsagePoint`, `ReadingType`, `LocalTimeParameters`, and the `IntervalBlock`s with
//! the actual `IntervalReading`s.

#[cfg(test)]
pub mod fixtures;
mod meter_id;
mod reading;
mod reading_type;

use std::collections::BTreeMap;

use chrono::FixedOffset;
use roxmltree::{Document, Node};

pub use self::{meter_id::MeterId, reading::IntervalReading, reading_type::ReadingType};
use crate::{error::ParseError, prelude::*};

pub const ATOM: &str = "http://www.w3.org/2005/Atom";
pub const ESPI: &str = "http://naesb.org/espi";

/// Everything extracted from a single export document.
#[must_use]
pub struct Export {
    pub meters: BTreeMap<MeterId, MeterExport>,

    /// Standard time offset from `LocalTimeParameters`, if the export has one.
    pub utc_offset: Option<FixedOffset>,

    /// Interval readings which failed the schema mapping.
    pub n_skipped: usize,
}

#[must_use]
#[derive(Default)]
pub struct MeterExport {
    /// Title of the usage point entry.
    pub title: Option<String>,

    /// Readings in document order.
    pub readings: Vec<IntervalReading>,

    /// Interval readings of this usage point which failed the schema mapping.
    pub n_skipped: usize,
}

impl Export {
    #[instrument(skip_all)]
    pub fn try_parse(text: &str) -> Result<Self, ParseError> {
        let document = Document::parse(text)?;
        let root = document.root_element();
        if !root.has_tag_name((ATOM, "feed")) && !root.has_tag_name((ATOM, "entry")) {
            return Err(ParseError::UnexpectedRoot(root.tag_name().name().to_owned()));
        }

        let reading_type = ReadingType::find_in(root);
        let utc_offset = find_utc_offset(root);

        let mut meters = BTreeMap::<MeterId, MeterExport>::new();
        let mut n_blocks = 0_usize;
        let mut n_skipped = 0_usize;

        for entry in root.descendants().filter(|node| node.has_tag_name((ATOM, "entry"))) {
            let Some(content) = entry.children().find(|node| node.has_tag_name((ATOM, "content")))
            else {
                continue;
            };
            let meter_id = MeterId::from_entry(entry);

            if content.descendants().any(|node| node.has_tag_name((ESPI, "UsagePoint"))) {
                meters.entry(meter_id.clone()).or_default().title = entry
                    .children()
                    .find(|node| node.has_tag_name((ATOM, "title")))
                    .and_then(|node| node.text())
                    .map(|title| title.trim().to_owned());
            }

            for block in content.descendants().filter(|node| node.has_tag_name((ESPI, "IntervalBlock")))
            {
                n_blocks += 1;
                let meter = meters.entry(meter_id.clone()).or_default();
                for node in block.children().filter(|node| node.has_tag_name((ESPI, "IntervalReading")))
                {
                    match IntervalReading::try_from_node(node, reading_type) {
                        Ok(reading) => meter.readings.push(reading),
                        Err(error) => {
                            debug!(%meter_id, %error, "skipping the interval reading");
                            meter.n_skipped += 1;
                            n_skipped += 1;
                        }
                    }
                }
            }
        }

        if n_blocks == 0 {
            return Err(ParseError::NoIntervalBlocks);
        }
        meters.retain(|meter_id, meter| {
            if meter.readings.is_empty() {
                debug!(%meter_id, "usage point without readings");
            }
            !meter.readings.is_empty()
        });
        Ok(Self { meters, utc_offset, n_skipped })
    }

    pub fn n_readings(&self) -> usize {
        self.meters.values().map(|meter| meter.readings.len()).sum()
    }
}

/// First child element in the ESPI namespace with the given local name.
fn espi_child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| child.has_tag_name((ESPI, name)))
}

fn find_utc_offset(root: Node) -> Option<FixedOffset> {
    let parameters =
        root.descendants().find(|node| node.has_tag_name((ESPI, "LocalTimeParameters")))?;
    let text = espi_child(parameters, "tzOffset")?.text()?.trim();
    let utc_offset = text.parse::<i32>().ok().and_then(FixedOffset::east_opt);
    if utc_offset.is_none() {
        warn!(text, "ignoring the invalid time zone offset");
    }
    utc_offset
}
