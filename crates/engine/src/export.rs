//! Export and print surfaces of a computed worksheet.
//!
//! Both are pure functions of the [`Computation`]: the same rows always give
//! the same bytes.

use std::fmt;

use csv::Writer;
use serde::Serialize;

use crate::{
    EngineError, ResultEngine,
    controls::ControlVariables,
    currency::CurrencyPair,
    derived::{Computation, DerivedRow},
};

#[derive(Serialize)]
struct ExportRow<'a> {
    brand: &'a str,
    model: &'a str,
    code: &'a str,
    description: &'a str,
    quantity: u32,
    cartons: String,
    volume_m3: String,
    unit_cost_foreign: String,
    unit_cost_local: String,
    landed_unit_cost: String,
    target_price: String,
    profit_per_unit: String,
    margin_percent: String,
}

impl<'a> From<&'a DerivedRow> for ExportRow<'a> {
    fn from(row: &'a DerivedRow) -> Self {
        Self {
            brand: &row.brand,
            model: &row.model,
            code: &row.code,
            description: &row.description,
            quantity: row.quantity,
            cartons: format!("{:.2}", row.volume.exact_cartons),
            volume_m3: format!("{:.4}", row.volume.line_volume_m3),
            unit_cost_foreign: format!("{:.2}", row.unit_cost_foreign),
            unit_cost_local: format!("{:.2}", row.costs.unit_cost_local_converted),
            landed_unit_cost: format!("{:.2}", row.costs.landed_unit_cost),
            target_price: format!("{:.2}", row.target_price),
            profit_per_unit: format!("{:.2}", row.margin.gross_profit_per_unit),
            margin_percent: format!("{:.1}", row.margin.margin_percent),
        }
    }
}

/// CSV with one record per derived row and a header line.
pub fn export_csv(computation: &Computation) -> ResultEngine<Vec<u8>> {
    let mut writer = Writer::from_writer(vec![]);
    if computation.rows.is_empty() {
        // serde only emits the header together with the first record.
        writer
            .write_record([
                "brand",
                "model",
                "code",
                "description",
                "quantity",
                "cartons",
                "volume_m3",
                "unit_cost_foreign",
                "unit_cost_local",
                "landed_unit_cost",
                "target_price",
                "profit_per_unit",
                "margin_percent",
            ])
            .map_err(|err| EngineError::Export(err.to_string()))?;
    }
    for row in &computation.rows {
        writer
            .serialize(ExportRow::from(row))
            .map_err(|err| EngineError::Export(err.to_string()))?;
    }
    writer
        .into_inner()
        .map_err(|err| EngineError::Export(err.to_string()))
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        value.to_string()
    } else {
        let mut out: String = value.chars().take(width.saturating_sub(1)).collect();
        out.push('~');
        out
    }
}

/// Fixed-width text rendering for printing.
pub fn render_print(
    title: &str,
    computation: &Computation,
    controls: &ControlVariables,
    currencies: CurrencyPair,
) -> ResultEngine<String> {
    let mut out = String::new();
    write_print(&mut out, title, computation, controls, currencies)
        .map_err(|err| EngineError::Export(err.to_string()))?;
    Ok(out)
}

fn write_print(
    out: &mut impl fmt::Write,
    title: &str,
    computation: &Computation,
    controls: &ControlVariables,
    currencies: CurrencyPair,
) -> fmt::Result {
    let local = currencies.local;

    writeln!(out, "{title}")?;
    writeln!(out, "{}", "=".repeat(title.chars().count().max(8)))?;
    writeln!(
        out,
        "Exchange rate: 1 {} = {:.4} {}",
        currencies.foreign, controls.exchange_rate, local
    )?;
    writeln!(
        out,
        "Ocean: {}  Trucking: {}  Duty: {}",
        local.format(controls.ocean_lump_sum),
        local.format(controls.trucking_lump_sum),
        if controls.duty_exempt {
            "exempt (Form E)".to_string()
        } else {
            format!("{:.2}%", controls.manual_duty_percent)
        }
    )?;
    writeln!(
        out,
        "Fees per unit: consumable {}  license {}",
        local.format(controls.consumable_fee_per_unit),
        local.format(controls.license_fee_per_unit)
    )?;
    writeln!(out)?;

    writeln!(
        out,
        "{:<12} {:<24} {:>6} {:>8} {:>9} {:>10} {:>10} {:>10} {:>10} {:>7}",
        "Code", "Item", "Qty", "Cartons", "CBM", "Cost", "Landed", "Price", "Profit", "Margin"
    )?;
    for row in &computation.rows {
        let item = format!("{} {}", row.brand, row.model);
        let flag = if row.margin.is_low_margin { " !" } else { "" };
        writeln!(
            out,
            "{:<12} {:<24} {:>6} {:>8.2} {:>9.4} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>6.1}%{flag}",
            truncate(&row.code, 12),
            truncate(&item, 24),
            row.quantity,
            row.volume.exact_cartons,
            row.volume.line_volume_m3,
            row.costs.unit_cost_local_converted,
            row.costs.landed_unit_cost,
            row.target_price,
            row.margin.gross_profit_per_unit,
            row.margin.margin_percent,
        )?;
    }

    let totals = &computation.totals;
    writeln!(out)?;
    writeln!(
        out,
        "Units: {}  Cartons: {:.2}  Volume: {:.4} m3",
        totals.total_quantity, totals.total_cartons, totals.allocation.total_volume_m3
    )?;
    writeln!(
        out,
        "Goods: {}  Logistics: {}  Tax: {}  Duty: {}",
        local.format(totals.allocation.total_cost_local_converted),
        local.format(totals.allocation.total_logistics),
        local.format(totals.allocation.total_tax),
        local.format(totals.allocation.total_duty)
    )?;
    writeln!(
        out,
        "Cash outlay: {}",
        local.format(totals.allocation.cash_outlay)
    )?;
    writeln!(
        out,
        "Revenue: {}  Profit: {}  Margin: {:.1}%",
        local.format(totals.total_revenue),
        local.format(totals.total_profit),
        totals.overall_margin_percent
    )?;
    if totals.low_margin_lines > 0 {
        writeln!(out, "Low margin lines (!): {}", totals.low_margin_lines)?;
    }
    Ok(())
}
