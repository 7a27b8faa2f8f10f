use std::{
    fmt::{Debug, Display, Formatter},
    ops::Div,
};

use crate::quantity::{Quantity, power::Kilowatts, time::Hours};

pub type KilowattHours = Quantity<f64, 1, 1>;

impl KilowattHours {
    /// Convert a raw meter value in watt-hours, scaled by `10^power_of_ten_multiplier`.
    pub fn from_scaled_watt_hours(value: i64, power_of_ten_multiplier: i32) -> Self {
        #[expect(clippy::cast_precision_loss)]
        Self(value as f64 * 10_f64.powi(power_of_ten_multiplier) * 0.001)
    }
}

impl Display for KilowattHours {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} kWh", self.0)
    }
}

impl Debug for KilowattHours {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}kWh", self.0)
    }
}

impl Div<Hours> for KilowattHours {
    type Output = Kilowatts;

    fn div(self, rhs: Hours) -> Self::Output {
        Quantity(self.0 / rhs.0)
    }
}
