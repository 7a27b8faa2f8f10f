//! Synthetic export documents for the tests.

use std::fmt::Write;

#[must_use]
pub struct Feed {
    meter_id: String,
    entries: Vec<String>,
    n_blocks: usize,
}

impl Feed {
    pub fn new(meter_id: &str) -> Self {
        Self { meter_id: meter_id.to_owned(), entries: Vec::new(), n_blocks: 0 }
    }

    /// Switch the following blocks to another usage point.
    pub fn meter(mut self, meter_id: &str) -> Self {
        meter_id.clone_into(&mut self.meter_id);
        self
    }

    pub fn title(mut self, title: &str) -> Self {
        self.entries.push(format!(
            r#"<entry>
                <link rel="self" href="https://example.com/espi/1_1/resource/Subscription/1/UsagePoint/{}"/>
                <title>{title}</title>
                <content><espi:UsagePoint><espi:ServiceCategory><espi:kind>0</espi:kind></espi:ServiceCategory></espi:UsagePoint></content>
            </entry>"#,
            self.meter_id,
        ));
        self
    }

    pub fn tz_offset(mut self, seconds: i32) -> Self {
        self.entries.push(format!(
            r#"<entry>
                <link rel="self" href="https://example.com/espi/1_1/resource/LocalTimeParameters/1"/>
                <content><espi:LocalTimeParameters><espi:dstOffset>3600</espi:dstOffset><espi:tzOffset>{seconds}</espi:tzOffset></espi:LocalTimeParameters></content>
            </entry>"#,
        ));
        self
    }

    pub fn power_of_ten_multiplier(mut self, multiplier: i32) -> Self {
        self.entries.push(format!(
            r#"<entry>
                <link rel="self" href="https://example.com/espi/1_1/resource/ReadingType/1"/>
                <content><espi:ReadingType><espi:powerOfTenMultiplier>{multiplier}</espi:powerOfTenMultiplier><espi:uom>72</espi:uom></espi:ReadingType></content>
            </entry>"#,
        ));
        self
    }

    pub fn block(mut self, readings: &[String]) -> Self {
        self.n_blocks += 1;
        self.entries.push(format!(
            r#"<entry>
                <link rel="self" href="https://example.com/espi/1_1/resource/Subscription/1/UsagePoint/{}/MeterReading/1/IntervalBlock/{}"/>
                <content><espi:IntervalBlock>{}</espi:IntervalBlock></content>
            </entry>"#,
            self.meter_id,
            self.n_blocks,
            readings.concat(),
        ));
        self
    }

    #[must_use]
    pub fn to_xml(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:espi="http://naesb.org/espi">
<title>Green Button Usage Feed</title>
"#,
        );
        for entry in &self.entries {
            writeln!(xml, "{entry}").unwrap();
        }
        xml.push_str("</feed>\n");
        xml
    }
}

#[must_use]
pub fn reading(start: i64, duration: i64, value: i64) -> String {
    format!(
        "<espi:IntervalReading>\
            <espi:timePeriod><espi:duration>{duration}</espi:duration><espi:start>{start}</espi:start></espi:timePeriod>\
            <espi:value>{value}</espi:value>\
        </espi:IntervalReading>"
    )
}

/// Hourly readings starting at `start` with the given watt-hour values.
#[must_use]
pub fn hourly(start: i64, values: &[i64]) -> Vec<String> {
    values.iter().zip(0..).map(|(value, index)| reading(start + index * 3600, 3600, *value)).collect()
}
