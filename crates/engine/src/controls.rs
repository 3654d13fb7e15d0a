//! Scenario-wide control variables: exchange rate, lump sums, duty and fees.

use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

pub const DEFAULT_EXCHANGE_RATE: f64 = 4.75;
pub const DEFAULT_OCEAN_LUMP_SUM: f64 = 5000.0;
pub const DEFAULT_TRUCKING_LUMP_SUM: f64 = 800.0;
pub const DEFAULT_MANUAL_DUTY_PERCENT: f64 = 10.0;
pub const DEFAULT_CONSUMABLE_FEE_PER_UNIT: f64 = 2.0;
pub const DEFAULT_LICENSE_FEE_PER_UNIT: f64 = 0.30;

/// Inputs shared by every line of a scenario.
///
/// Amounts are in local currency; `exchange_rate` converts one unit of the
/// foreign currency into local currency.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControlVariables {
    pub exchange_rate: f64,
    pub ocean_lump_sum: f64,
    pub trucking_lump_sum: f64,
    /// Form E status: when set the duty rate is zero.
    pub duty_exempt: bool,
    /// Only read when `duty_exempt` is `false`.
    pub manual_duty_percent: f64,
    pub consumable_fee_per_unit: f64,
    pub license_fee_per_unit: f64,
}

impl Default for ControlVariables {
    fn default() -> Self {
        Self {
            exchange_rate: DEFAULT_EXCHANGE_RATE,
            ocean_lump_sum: DEFAULT_OCEAN_LUMP_SUM,
            trucking_lump_sum: DEFAULT_TRUCKING_LUMP_SUM,
            duty_exempt: true,
            manual_duty_percent: DEFAULT_MANUAL_DUTY_PERCENT,
            consumable_fee_per_unit: DEFAULT_CONSUMABLE_FEE_PER_UNIT,
            license_fee_per_unit: DEFAULT_LICENSE_FEE_PER_UNIT,
        }
    }
}

impl ControlVariables {
    /// Check every field is finite and in range.
    pub fn validate(&self) -> ResultEngine<()> {
        if !self.exchange_rate.is_finite() || self.exchange_rate <= 0.0 {
            return Err(EngineError::InvalidAmount(format!(
                "exchange rate must be > 0, got {}",
                self.exchange_rate
            )));
        }
        let non_negative = [
            ("ocean lump sum", self.ocean_lump_sum),
            ("trucking lump sum", self.trucking_lump_sum),
            ("duty percent", self.manual_duty_percent),
            ("consumable fee", self.consumable_fee_per_unit),
            ("license fee", self.license_fee_per_unit),
        ];
        for (label, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(EngineError::InvalidAmount(format!(
                    "{label} must be a finite value >= 0, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Ocean plus trucking.
    #[must_use]
    pub fn total_logistics(&self) -> f64 {
        self.ocean_lump_sum + self.trucking_lump_sum
    }

    /// Duty rate as a fraction.
    #[must_use]
    pub fn duty_rate(&self) -> f64 {
        if self.duty_exempt {
            0.0
        } else {
            self.manual_duty_percent / 100.0
        }
    }

    #[must_use]
    pub fn fees_per_unit(&self) -> f64 {
        self.consumable_fee_per_unit + self.license_fee_per_unit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let controls = ControlVariables::default();
        controls.validate().unwrap();
        assert_eq!(controls.total_logistics(), 5800.0);
        assert_eq!(controls.duty_rate(), 0.0);
    }

    #[test]
    fn duty_rate_only_applies_without_exemption() {
        let controls = ControlVariables {
            duty_exempt: false,
            manual_duty_percent: 15.0,
            ..Default::default()
        };
        assert!((controls.duty_rate() - 0.15).abs() < 1e-12);
    }

    #[test]
    fn rejects_non_positive_rate() {
        let controls = ControlVariables {
            exchange_rate: 0.0,
            ..Default::default()
        };
        assert!(controls.validate().is_err());
    }

    #[test]
    fn rejects_negative_or_nan_amounts() {
        let negative = ControlVariables {
            trucking_lump_sum: -1.0,
            ..Default::default()
        };
        assert!(negative.validate().is_err());

        let nan = ControlVariables {
            license_fee_per_unit: f64::NAN,
            ..Default::default()
        };
        assert!(nan.validate().is_err());
    }
}
