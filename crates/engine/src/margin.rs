//! Gross profit and margin of a line against its target price.

use serde::{Deserialize, Serialize};

/// Lines under this margin are flagged. The flag never blocks anything.
pub const LOW_MARGIN_THRESHOLD_PERCENT: f64 = 20.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub gross_profit_per_unit: f64,
    /// Profit as a percentage of the target price, `0` when the price is `0`.
    pub margin_percent: f64,
    pub is_low_margin: bool,
}

#[must_use]
pub fn evaluate(landed_unit_cost: f64, target_price: f64) -> Margin {
    let gross_profit_per_unit = target_price - landed_unit_cost;
    let margin_percent = margin_percent(gross_profit_per_unit, target_price);

    Margin {
        gross_profit_per_unit,
        margin_percent,
        is_low_margin: margin_percent < LOW_MARGIN_THRESHOLD_PERCENT,
    }
}

/// `profit / revenue * 100`, guarded against a zero revenue.
#[must_use]
pub fn margin_percent(profit: f64, revenue: f64) -> f64 {
    if revenue > 0.0 {
        profit / revenue * 100.0
    } else {
        0.0
    }
}
