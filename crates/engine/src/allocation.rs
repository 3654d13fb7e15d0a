//! Allocation of shared landed costs across order lines.
//!
//! Two lump sums are spread over the lines with different weights:
//!
//! - **logistics** (ocean + trucking) by *volume share*, since freight is
//!   charged by space;
//! - **tax** by *value share*, since it is levied on declared value.
//!
//! Allocation needs totals over the whole basket, so it runs in two passes:
//! the first converts unit costs and accumulates totals, the second computes
//! each line's shares and its landed unit cost.
//!
//! Every share falls back to `0` when its total is `0`: the result never
//! contains NaN or infinities.

use serde::{Deserialize, Serialize};

use crate::controls::ControlVariables;

/// Flat sales tax applied to the tax base.
pub const TAX_RATE: f64 = 0.10;

/// What the allocator needs to know about one line.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AllocationInput {
    pub quantity: u32,
    pub line_volume_m3: f64,
    pub unit_cost_foreign: f64,
    pub unit_cost_local: f64,
}

/// Per-unit costs of one line, in local currency.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LineCosts {
    pub unit_cost_local_converted: f64,
    pub allocated_logistics_per_unit: f64,
    pub allocated_tax_per_unit: f64,
    pub unit_duty: f64,
    pub landed_unit_cost: f64,
}

/// Basket-wide figures of one allocation run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocationTotals {
    pub total_volume_m3: f64,
    pub total_cost_local_converted: f64,
    pub total_logistics: f64,
    /// Goods value plus ocean freight. Trucking is not part of it.
    pub tax_base: f64,
    pub total_tax: f64,
    pub duty_rate: f64,
    pub total_duty: f64,
    /// Money out of pocket: goods, logistics, tax and duty.
    pub cash_outlay: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Allocation {
    /// One entry per input, in input order.
    pub lines: Vec<LineCosts>,
    pub totals: AllocationTotals,
}

/// Converted unit cost: a foreign cost wins over the local fallback.
#[must_use]
pub fn convert_unit_cost(unit_cost_foreign: f64, unit_cost_local: f64, exchange_rate: f64) -> f64 {
    if unit_cost_foreign > 0.0 {
        unit_cost_foreign * exchange_rate
    } else {
        unit_cost_local
    }
}

/// `part / total`, or `0` if there is nothing to share.
fn share(part: f64, total: f64) -> f64 {
    if total > 0.0 { part / total } else { 0.0 }
}

fn per_unit(amount: f64, quantity: u32) -> f64 {
    if quantity > 0 {
        amount / f64::from(quantity)
    } else {
        0.0
    }
}

/// Allocate the shared costs of `controls` over `inputs`.
#[must_use]
pub fn allocate(inputs: &[AllocationInput], controls: &ControlVariables) -> Allocation {
    // Pass 1: converted costs and basket totals.
    let mut converted = Vec::with_capacity(inputs.len());
    let mut total_volume_m3 = 0.0;
    let mut total_cost_local_converted = 0.0;
    for input in inputs {
        let unit_cost = convert_unit_cost(
            input.unit_cost_foreign,
            input.unit_cost_local,
            controls.exchange_rate,
        );
        total_volume_m3 += input.line_volume_m3;
        total_cost_local_converted += unit_cost * f64::from(input.quantity);
        converted.push(unit_cost);
    }

    let total_logistics = controls.total_logistics();
    let tax_base = total_cost_local_converted + controls.ocean_lump_sum;
    let total_tax = tax_base * TAX_RATE;
    let duty_rate = controls.duty_rate();
    let fees_per_unit = controls.fees_per_unit();

    // Pass 2: shares and landed cost.
    let lines = inputs
        .iter()
        .zip(converted)
        .map(|(input, unit_cost_local_converted)| {
            let volume_share = share(input.line_volume_m3, total_volume_m3);
            let allocated_logistics_per_unit =
                per_unit(volume_share * total_logistics, input.quantity);

            let line_value = unit_cost_local_converted * f64::from(input.quantity);
            let value_share = share(line_value, total_cost_local_converted);
            let allocated_tax_per_unit = per_unit(value_share * total_tax, input.quantity);

            let unit_duty = unit_cost_local_converted * duty_rate;

            LineCosts {
                unit_cost_local_converted,
                allocated_logistics_per_unit,
                allocated_tax_per_unit,
                unit_duty,
                landed_unit_cost: unit_cost_local_converted
                    + allocated_logistics_per_unit
                    + unit_duty
                    + allocated_tax_per_unit
                    + fees_per_unit,
            }
        })
        .collect();

    let total_duty = total_cost_local_converted * duty_rate;
    Allocation {
        lines,
        totals: AllocationTotals {
            total_volume_m3,
            total_cost_local_converted,
            total_logistics,
            tax_base,
            total_tax,
            duty_rate,
            total_duty,
            cash_outlay: total_cost_local_converted + total_logistics + total_tax + total_duty,
        },
    }
}
