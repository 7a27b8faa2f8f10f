use std::fmt::{Debug, Display, Formatter};

use serde::Serialize;

/// Percentage rounded to one decimal place.
#[derive(Copy, Clone, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Percentage(pub f64);

impl Percentage {
    #[must_use]
    pub fn of(part: usize, whole: usize) -> Self {
        if whole == 0 {
            return Self(0.0);
        }
        #[expect(clippy::cast_precision_loss)]
        let ratio = part as f64 / whole as f64;
        Self((ratio * 1000.0).round() / 10.0)
    }
}

impl Debug for Percentage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for Percentage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}%", self.0)
    }
}
