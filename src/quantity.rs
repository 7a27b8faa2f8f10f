pub mod energy;
pub mod power;
pub mod time;

use std::ops::{Div, Mul};

use serde::{Deserialize, Serialize};

/// Physical quantity with its dimension encoded in the type.
///
/// `POWER` is the exponent of kilowatts and `TIME` is the exponent of hours,
/// so that `Quantity<f64, 1, 1>` is kilowatt-hours.
#[derive(
    Clone,
    Copy,
    Default,
    Deserialize,
    Eq,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    derive_more::Add,
    derive_more::AddAssign,
    derive_more::From,
    derive_more::FromStr,
    derive_more::Neg,
    derive_more::Sub,
    derive_more::SubAssign,
    derive_more::Sum,
)]
#[serde(transparent)]
pub struct Quantity<T, const POWER: isize, const TIME: isize>(pub T);

impl<const POWER: isize, const TIME: isize> Quantity<f64, POWER, TIME> {
    pub const ZERO: Self = Self(0.0);

    #[must_use]
    pub const fn is_finite(self) -> bool {
        self.0.is_finite()
    }
}

impl<T, const POWER: isize, const TIME: isize> Mul<T> for Quantity<T, POWER, TIME>
where
    T: Mul<T>,
{
    type Output = Quantity<T::Output, POWER, TIME>;

    fn mul(self, rhs: T) -> Self::Output {
        Quantity(self.0 * rhs)
    }
}

impl<T, const POWER: isize, const TIME: isize> Div<T> for Quantity<T, POWER, TIME>
where
    T: Div<T>,
{
    type Output = Quantity<T::Output, POWER, TIME>;

    fn div(self, rhs: T) -> Self::Output {
        Quantity(self.0 / rhs)
    }
}
