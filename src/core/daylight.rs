use std::f64::consts::TAU;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::{prelude::*, quantity::time::Hours};

/// Sun altitude at sunrise and sunset, accounting for refraction and the solar disc.
const SUNRISE_ALTITUDE_DEGREES: f64 = -0.833;

#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Location {
    /// Degrees, positive to the north.
    pub latitude: f64,
}

impl Default for Location {
    fn default() -> Self {
        Self::ANN_ARBOR
    }
}

impl Location {
    pub const ANN_ARBOR: Self = Self { latitude: 42.2808 };

    pub fn try_new(latitude: f64) -> Result<Self> {
        ensure!((-90.0..=90.0).contains(&latitude), "invalid latitude: {latitude}");
        Ok(Self { latitude })
    }

    /// Approximate time between sunrise and sunset.
    pub fn daylight_hours(self, date: NaiveDate) -> Hours {
        let declination = solar_declination(date);
        let latitude = self.latitude.to_radians();
        let cos_hour_angle = (SUNRISE_ALTITUDE_DEGREES.to_radians().sin()
            - latitude.sin() * declination.sin())
            / (latitude.cos() * declination.cos());
        if cos_hour_angle >= 1.0 {
            // Polar night.
            return Hours::ZERO;
        }
        if cos_hour_angle <= -1.0 {
            return Hours::from(24.0);
        }
        Hours::from(2.0 * cos_hour_angle.acos().to_degrees() / 15.0)
    }
}

/// Spencer's Fourier series for the solar declination, in radians.
fn solar_declination(date: NaiveDate) -> f64 {
    const COS: [f64; 3] = [-0.399_912, -0.006_758, -0.002_697];
    const SIN: [f64; 3] = [0.070_257, 0.000_907, 0.001_48];

    let gamma = TAU / 365.0 * f64::from(date.ordinal0());
    (1..=3)
        .zip(COS.into_iter().zip(SIN))
        .map(|(k, (cos, sin))| {
            let angle = f64::from(k) * gamma;
            cos.mul_add(angle.cos(), sin * angle.sin())
        })
        .sum::<f64>()
        + 0.006_918
}
