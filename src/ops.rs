pub mod interval;

use std::{
    fmt::{Debug, Formatter},
    ops::Sub,
};

use serde::Serialize;

/// Half-open range `start..end`.
#[must_use]
#[derive(Copy, Clone, Eq, PartialEq, Serialize)]
pub struct RangeExclusive<T: Copy> {
    /// Inclusive.
    pub start: T,

    /// Exclusive.
    pub end: T,
}

impl<T: Copy + Debug> Debug for RangeExclusive<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}..{:?}", self.start, self.end)
    }
}

impl<T: Copy> RangeExclusive<T> {
    pub const fn new(start: T, end: T) -> Self {
        Self { start, end }
    }
}

impl<T: Copy + Sub> RangeExclusive<T> {
    #[must_use]
    pub fn len(self) -> <T as Sub>::Output {
        self.end - self.start
    }
}

impl<T: Copy + Ord> RangeExclusive<T> {
    /// Intersection of the two ranges, if it is not empty.
    pub fn intersect(self, other: Self) -> Option<Self> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then_some(Self { start, end })
    }

    /// Smallest range covering both.
    pub fn union(self, other: Self) -> Self {
        Self { start: self.start.min(other.start), end: self.end.max(other.end) }
    }
}
