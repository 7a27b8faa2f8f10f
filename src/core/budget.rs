use bon::bon;
use chrono::TimeDelta;
use serde::Serialize;

use crate::{
    error::AnalysisError,
    quantity::{energy::KilowattHours, power::Kilowatts, time::Hours},
};

/// Battery the usage is checked against.
#[must_use]
#[derive(Copy, Clone, Debug, Serialize)]
pub struct BudgetConfig {
    pub battery_capacity: KilowattHours,

    /// How long the battery must carry the house.
    pub runtime: Hours,
}

#[bon]
impl BudgetConfig {
    #[builder]
    pub fn new(battery_capacity: KilowattHours, runtime: Hours) -> Result<Self, AnalysisError> {
        if !battery_capacity.is_finite() || battery_capacity <= KilowattHours::ZERO {
            return Err(AnalysisError::InvalidBudgetConfig(format!(
                "battery size must be positive, got {battery_capacity}"
            )));
        }
        if !runtime.is_finite() || runtime <= Hours::ZERO {
            return Err(AnalysisError::InvalidBudgetConfig(format!(
                "battery runtime must be positive, got {runtime}"
            )));
        }
        if runtime > Hours::from(24.0) {
            return Err(AnalysisError::InvalidBudgetConfig(format!(
                "battery runtime cannot exceed a day, got {runtime}"
            )));
        }
        Ok(Self { battery_capacity, runtime })
    }
}

impl BudgetConfig {
    /// Number of whole hours the worst-case window spans.
    #[must_use]
    pub fn window_len(&self) -> usize {
        #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let len = self.runtime.0.ceil() as usize;
        len
    }

    /// Share of the window's last hour that falls within the runtime, in `(0, 1]`.
    #[must_use]
    pub fn last_hour_share(&self) -> f64 {
        #[expect(clippy::cast_precision_loss)]
        let whole_hours = (self.window_len() - 1) as f64;
        self.runtime.0 - whole_hours
    }

    #[must_use]
    pub fn runtime_delta(&self) -> TimeDelta {
        #[expect(clippy::cast_possible_truncation)]
        let seconds = (self.runtime.0 * 3600.0).round() as i64;
        TimeDelta::seconds(seconds)
    }

    /// Average power the battery sustains over the runtime.
    pub fn sustained_power(&self) -> Kilowatts {
        self.battery_capacity / self.runtime
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn budget(battery_capacity: f64, runtime: f64) -> Result<BudgetConfig, AnalysisError> {
        BudgetConfig::builder()
            .battery_capacity(KilowattHours::from(battery_capacity))
            .runtime(Hours::from(runtime))
            .build()
    }

    #[test]
    fn test_ok() {
        let budget = budget(30.0, 3.0).unwrap();
        assert_eq!(budget.window_len(), 3);
        assert_abs_diff_eq!(budget.last_hour_share(), 1.0, epsilon = 1e-9);
        assert_eq!(budget.runtime_delta(), TimeDelta::hours(3));
        assert_abs_diff_eq!(budget.sustained_power().0, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_fractional_runtime() {
        let budget_2_5 = budget(10.0, 2.5).unwrap();
        assert_eq!(budget_2_5.window_len(), 3);
        assert_abs_diff_eq!(budget_2_5.last_hour_share(), 0.5, epsilon = 1e-9);
        assert_eq!(budget_2_5.runtime_delta(), TimeDelta::minutes(150));

        let budget_0_25 = budget(10.0, 0.25).unwrap();
        assert_eq!(budget_0_25.window_len(), 1);
        assert_abs_diff_eq!(budget_0_25.last_hour_share(), 0.25, epsilon = 1e-9);
    }

    #[test]
    fn test_invalid() {
        for (battery_capacity, runtime) in
            [(0.0, 3.0), (-1.0, 3.0), (f64::NAN, 3.0), (10.0, 0.0), (10.0, f64::INFINITY), (10.0, 25.0)]
        {
            assert!(
                matches!(budget(battery_capacity, runtime), Err(AnalysisError::InvalidBudgetConfig(_))),
                "{battery_capacity} kWh for {runtime} h must be rejected",
            );
        }
    }
}
