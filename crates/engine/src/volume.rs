//! Shipping volume and carton counts.
//!
//! Two carton semantics live here on purpose: the live worksheet uses the
//! fractional [`VolumeFigures::exact_cartons`], while the read-only shipment
//! report uses [`ceil_cartons`]. They are not interchangeable.

use serde::{Deserialize, Serialize};

use crate::{catalog::Packaging, order_line::OrderLine};

const CM3_PER_M3: f64 = 1_000_000.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeFigures {
    /// Cubic metres taken by one unit (its share of a carton).
    pub unit_volume_m3: f64,
    pub line_volume_m3: f64,
    /// `quantity / units_per_carton`, not rounded.
    pub exact_cartons: f64,
}

/// Volume of one unit: carton volume split across the units it holds.
///
/// Zero when any packaging dimension is missing.
#[must_use]
pub fn unit_volume_m3(packaging: &Packaging) -> f64 {
    let carton_cm3 = packaging.carton_volume_cm3();
    if carton_cm3 > 0.0 {
        carton_cm3 / CM3_PER_M3 / f64::from(packaging.carton_size())
    } else {
        0.0
    }
}

/// Volumetric figures of one order line.
#[must_use]
pub fn derive_volume(line: &OrderLine) -> VolumeFigures {
    let packaging = &line.variant.packaging;
    let quantity = f64::from(line.quantity);
    let unit_volume_m3 = unit_volume_m3(packaging);

    VolumeFigures {
        unit_volume_m3,
        line_volume_m3: unit_volume_m3 * quantity,
        exact_cartons: quantity / f64::from(packaging.carton_size()),
    }
}

/// Whole cartons needed to ship `quantity` units, as counted by the shipment
/// report.
#[must_use]
pub fn ceil_cartons(quantity: u32, units_per_carton: u32) -> u32 {
    quantity.div_ceil(units_per_carton.max(1))
}
