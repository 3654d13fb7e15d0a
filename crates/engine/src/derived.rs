//! The full, derived view of a worksheet.
//!
//! [`compute_derived_rows`] is a pure function of the lines and the control
//! variables. It is run after every mutation; nothing is cached between runs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    allocation::{self, AllocationInput, AllocationTotals, LineCosts},
    controls::ControlVariables,
    margin::{self, Margin},
    order_line::{OrderLine, TierLabel},
    volume::{self, VolumeFigures},
};

/// One rendered row: the line plus everything computed for it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DerivedRow {
    pub line_id: Uuid,
    pub variant_id: Uuid,
    pub brand: String,
    pub model: String,
    pub code: String,
    pub description: String,
    pub quantity: u32,
    pub unit_cost_foreign: f64,
    pub unit_cost_local: f64,
    pub target_price: f64,
    pub tier_label: TierLabel,
    #[serde(flatten)]
    pub volume: VolumeFigures,
    #[serde(flatten)]
    pub costs: LineCosts,
    #[serde(flatten)]
    pub margin: Margin,
    pub line_landed_cost: f64,
    pub line_revenue: f64,
    pub line_profit: f64,
}

/// Aggregates over all rows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub total_quantity: u64,
    pub total_cartons: f64,
    #[serde(flatten)]
    pub allocation: AllocationTotals,
    pub total_landed_cost: f64,
    pub total_revenue: f64,
    pub total_profit: f64,
    pub overall_margin_percent: f64,
    pub low_margin_lines: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Computation {
    pub rows: Vec<DerivedRow>,
    pub totals: Totals,
}

/// Volume → allocation → margin over the whole line set.
#[must_use]
pub fn compute_derived_rows(lines: &[OrderLine], controls: &ControlVariables) -> Computation {
    let volumes: Vec<VolumeFigures> = lines.iter().map(volume::derive_volume).collect();
    let inputs: Vec<AllocationInput> = lines
        .iter()
        .zip(&volumes)
        .map(|(line, volume)| AllocationInput {
            quantity: line.quantity,
            line_volume_m3: volume.line_volume_m3,
            unit_cost_foreign: line.variant.costs.foreign,
            unit_cost_local: line.variant.costs.local,
        })
        .collect();
    let allocation = allocation::allocate(&inputs, controls);

    let mut totals = Totals {
        allocation: allocation.totals,
        ..Default::default()
    };

    let rows: Vec<DerivedRow> = lines
        .iter()
        .zip(volumes)
        .zip(allocation.lines)
        .map(|((line, volume), costs)| {
            let margin = margin::evaluate(costs.landed_unit_cost, line.target_price);
            let quantity = f64::from(line.quantity);
            let row = DerivedRow {
                line_id: line.id,
                variant_id: line.variant.id,
                brand: line.variant.brand.clone(),
                model: line.variant.model.clone(),
                code: line.variant.code.clone(),
                description: line.variant.description.clone(),
                quantity: line.quantity,
                unit_cost_foreign: line.variant.costs.foreign,
                unit_cost_local: line.variant.costs.local,
                target_price: line.target_price,
                tier_label: line.tier_label,
                volume,
                costs,
                margin,
                line_landed_cost: costs.landed_unit_cost * quantity,
                line_revenue: line.target_price * quantity,
                line_profit: margin.gross_profit_per_unit * quantity,
            };

            totals.total_quantity += u64::from(line.quantity);
            totals.total_cartons += volume.exact_cartons;
            totals.total_landed_cost += row.line_landed_cost;
            totals.total_revenue += row.line_revenue;
            totals.total_profit += row.line_profit;
            if margin.is_low_margin {
                totals.low_margin_lines += 1;
            }
            row
        })
        .collect();

    totals.overall_margin_percent = margin::margin_percent(totals.total_profit, totals.total_revenue);

    tracing::debug!(
        lines = rows.len(),
        total_volume_m3 = totals.allocation.total_volume_m3,
        cash_outlay = totals.allocation.cash_outlay,
        "recomputed worksheet"
    );

    Computation { rows, totals }
}
