//! Read-only shipment report.
//!
//! Unlike the live worksheet, the report counts whole cartons: a part-filled
//! carton still ships as one.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    order_line::OrderLine,
    volume::{ceil_cartons, derive_volume},
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShipmentLine {
    pub line_id: Uuid,
    pub code: String,
    pub description: String,
    pub quantity: u32,
    pub units_per_carton: u32,
    pub cartons: u32,
    pub volume_m3: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ShipmentReport {
    pub lines: Vec<ShipmentLine>,
    pub total_cartons: u64,
    pub total_volume_m3: f64,
}

#[must_use]
pub fn shipment_report(lines: &[OrderLine]) -> ShipmentReport {
    let mut report = ShipmentReport::default();
    for line in lines {
        let packaging = &line.variant.packaging;
        let cartons = ceil_cartons(line.quantity, packaging.units_per_carton);
        let volume_m3 = derive_volume(line).line_volume_m3;

        report.total_cartons += u64::from(cartons);
        report.total_volume_m3 += volume_m3;
        report.lines.push(ShipmentLine {
            line_id: line.id,
            code: line.variant.code.clone(),
            description: line.variant.description.clone(),
            quantity: line.quantity,
            units_per_carton: packaging.carton_size(),
            cartons,
            volume_m3,
        });
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::{CatalogVariant, Packaging, PriceTiers, UnitCosts},
        derived::compute_derived_rows,
        controls::ControlVariables,
        order_line::PriceTier,
    };

    fn line(quantity: u32, units_per_carton: u32) -> OrderLine {
        let variant = CatalogVariant {
            id: Uuid::new_v4(),
            brand: "Acme".to_string(),
            model: "M".to_string(),
            code: format!("AC-{units_per_carton}"),
            description: String::new(),
            packaging: Packaging {
                units_per_carton,
                length_cm: 10.0,
                width_cm: 10.0,
                height_cm: 10.0,
            },
            costs: UnitCosts::default(),
            prices: PriceTiers::default(),
        };
        OrderLine::from_variant(&variant, quantity, PriceTier::Standard).unwrap()
    }

    #[test]
    fn report_rounds_cartons_up() {
        let lines = [line(9, 4), line(8, 4), line(3, 0)];
        let report = shipment_report(&lines);
        let cartons: Vec<u32> = report.lines.iter().map(|l| l.cartons).collect();
        assert_eq!(cartons, vec![3, 2, 3]);
        assert_eq!(report.total_cartons, 8);
        assert_eq!(report.lines[2].units_per_carton, 1);
    }

    #[test]
    fn report_and_worksheet_count_cartons_differently() {
        let lines = [line(9, 4)];
        let report = shipment_report(&lines);
        let computation = compute_derived_rows(&lines, &ControlVariables::default());

        assert_eq!(report.lines[0].cartons, 3);
        assert!((computation.rows[0].volume.exact_cartons - 2.25).abs() < 1e-9);
        assert!((report.total_volume_m3 - computation.totals.allocation.total_volume_m3).abs() < 1e-12);
    }
}
