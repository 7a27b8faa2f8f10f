//! Merging several exports into one deduplicated, time-ordered reading set per meter.

use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    path::PathBuf,
};

use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use itertools::Itertools;
use serde::Serialize;

use crate::{
    error::{AnalysisError, ParseError},
    espi::{Export, IntervalReading, MeterId},
    ops::{RangeExclusive, interval::Interval},
    prelude::*,
};

#[must_use]
pub struct Import {
    pub meters: Vec<Meter>,
    pub files: Vec<FileCoverage>,
    pub failures: Vec<FileFailure>,

    /// Offset of the first export that declares one.
    pub utc_offset: Option<FixedOffset>,
}

#[must_use]
pub struct Meter {
    pub id: MeterId,
    pub title: Option<String>,

    /// Sorted by start, no two readings share a start.
    pub readings: Vec<IntervalReading>,

    /// Readings replaced by a later export with the same start and duration.
    pub n_duplicates: usize,

    /// Readings overlapped by a reading of a finer resolution.
    pub n_superseded: usize,

    /// Entries of this meter that failed the schema mapping, across all files.
    pub n_skipped: usize,
}

#[must_use]
#[derive(Clone, Serialize)]
pub struct FileCoverage {
    pub path: PathBuf,
    pub interval: Option<Interval<Utc>>,
    pub n_readings: usize,
    pub n_skipped: usize,
}

#[must_use]
#[derive(Clone, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub reason: String,
}

impl Import {
    /// Read and merge the exports.
    ///
    /// A missing or unreadable file aborts the import, while a file that fails
    /// to parse is only recorded in [`Import::failures`].
    #[instrument(skip_all, fields(n_paths = paths.len()))]
    pub fn try_from_paths(paths: &[PathBuf]) -> Result<Self, AnalysisError> {
        let mut exports = Vec::new();
        for path in paths.iter().collect::<BTreeSet<_>>() {
            let text = fs::read_to_string(path)
                .map_err(|source| AnalysisError::InputNotFound { path: path.clone(), source })?;
            let export = Export::try_parse(&text);
            match &export {
                Ok(export) => info!(
                    path = %path.display(),
                    n_meters = export.meters.len(),
                    n_readings = export.n_readings(),
                    n_skipped = export.n_skipped,
                    "parsed",
                ),
                Err(error) => error!(path = %path.display(), %error, "skipping the file"),
            }
            exports.push((path.clone(), export));
        }
        Self::try_merge(exports)
    }

    /// Merge the parsed exports.
    ///
    /// The exports are ordered by path first, so the result does not depend on the
    /// order they were given in. For the same start and duration, the reading from
    /// the later path wins.
    pub fn try_merge(
        mut exports: Vec<(PathBuf, Result<Export, ParseError>)>,
    ) -> Result<Self, AnalysisError> {
        let n_files = exports.len();
        exports.sort_by(|(lhs, _), (rhs, _)| lhs.cmp(rhs));

        let mut files = Vec::new();
        let mut failures = Vec::new();
        let mut utc_offset: Option<FixedOffset> = None;
        let mut builders = BTreeMap::<MeterId, MeterBuilder>::new();

        for (path, export) in exports {
            let export = match export {
                Ok(export) => export,
                Err(error) => {
                    failures.push(FileFailure { path, reason: error.to_string() });
                    continue;
                }
            };
            match (utc_offset, export.utc_offset) {
                (None, offset) => utc_offset = offset,
                (Some(known), Some(offset)) if known != offset => {
                    warn!(path = %path.display(), %known, %offset, "conflicting time zone offsets");
                }
                _ => {}
            }
            files.push(FileCoverage::new(path, &export));
            for (meter_id, meter_export) in export.meters {
                let builder = builders.entry(meter_id).or_default();
                if builder.title.is_none() {
                    builder.title = meter_export.title;
                }
                builder.n_skipped += meter_export.n_skipped;
                for reading in meter_export.readings {
                    let key = (reading.interval.start, reading.duration());
                    if builder.readings.insert(key, reading).is_some() {
                        builder.n_duplicates += 1;
                    }
                }
            }
        }

        let meters =
            builders.into_iter().map(|(meter_id, builder)| builder.build(meter_id)).collect_vec();
        if meters.is_empty() {
            return Err(AnalysisError::EmptySeries { n_files });
        }
        Ok(Self { meters, files, failures, utc_offset })
    }
}

impl FileCoverage {
    fn new(path: PathBuf, export: &Export) -> Self {
        let interval = export
            .meters
            .values()
            .flat_map(|meter| &meter.readings)
            .map(|reading| reading.interval)
            .reduce(RangeExclusive::union);
        Self { path, interval, n_readings: export.n_readings(), n_skipped: export.n_skipped }
    }
}

#[derive(Default)]
struct MeterBuilder {
    title: Option<String>,
    readings: BTreeMap<(DateTime<Utc>, TimeDelta), IntervalReading>,
    n_duplicates: usize,
    n_skipped: usize,
}

impl MeterBuilder {
    /// Drop the readings overlapped by finer ones: exports often publish daily totals
    /// next to the hourly readings of the same day.
    fn build(self, id: MeterId) -> Meter {
        let readings = self
            .readings
            .values()
            .filter(|reading| !self.is_superseded(reading))
            .copied()
            .collect_vec();
        let n_superseded = self.readings.len() - readings.len();
        if n_superseded != 0 {
            info!(%id, n_superseded, "dropped coarser readings");
        }
        Meter {
            id,
            title: self.title,
            readings,
            n_duplicates: self.n_duplicates,
            n_superseded,
            n_skipped: self.n_skipped,
        }
    }

    /// Whether a reading of a shorter duration overlaps the given one.
    fn is_superseded(&self, reading: &IntervalReading) -> bool {
        let duration = reading.duration();
        // Any overlapping shorter reading starts less than `duration` before this one.
        let lower = reading
            .interval
            .start
            .checked_sub_signed(duration)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        self.readings
            .range((lower, TimeDelta::zero())..(reading.interval.end, TimeDelta::zero()))
            .any(|((_, other_duration), other)| {
                *other_duration < duration && other.interval.intersect(reading.interval).is_some()
            })
    }
}
