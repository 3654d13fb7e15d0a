//! Purchasable catalog variants.
//!
//! A [`CatalogVariant`] is owned by the catalog and read-only to the engine:
//! order lines copy it at add-time, so later catalog edits never change a
//! line that already exists.

use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, order_line::PriceTier};

/// Physical packaging of a variant.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Packaging {
    /// Units packed in one carton. `0` means "unknown" and is read as `1`.
    pub units_per_carton: u32,
    pub length_cm: f64,
    pub width_cm: f64,
    pub height_cm: f64,
}

impl Packaging {
    /// Carton size used as a divisor, never zero.
    #[must_use]
    pub fn carton_size(&self) -> u32 {
        self.units_per_carton.max(1)
    }

    /// Outer carton volume in cubic centimetres.
    #[must_use]
    pub fn carton_volume_cm3(&self) -> f64 {
        self.length_cm * self.width_cm * self.height_cm
    }
}

/// Unit purchase cost, in the foreign and in the local currency.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitCosts {
    pub foreign: f64,
    pub local: f64,
}

/// The three selling prices a variant carries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceTiers {
    pub standard: f64,
    pub online: f64,
    pub proposal: f64,
}

impl PriceTiers {
    /// Price of the given tier.
    #[must_use]
    pub const fn price(&self, tier: PriceTier) -> f64 {
        match tier {
            PriceTier::Standard => self.standard,
            PriceTier::Online => self.online,
            PriceTier::Proposal => self.proposal,
        }
    }
}

/// A purchasable variant as exposed by the catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogVariant {
    pub id: Uuid,
    pub brand: String,
    pub model: String,
    pub code: String,
    pub description: String,
    pub packaging: Packaging,
    pub costs: UnitCosts,
    pub prices: PriceTiers,
}

impl CatalogVariant {
    /// Dimensions, costs and prices must all be finite and non-negative.
    pub fn validate(&self) -> ResultEngine<()> {
        let amounts = [
            ("length", self.packaging.length_cm),
            ("width", self.packaging.width_cm),
            ("height", self.packaging.height_cm),
            ("foreign unit cost", self.costs.foreign),
            ("local unit cost", self.costs.local),
            ("standard price", self.prices.standard),
            ("online price", self.prices.online),
            ("proposal price", self.prices.proposal),
        ];
        for (label, value) in amounts {
            if !value.is_finite() || value < 0.0 {
                return Err(EngineError::InvalidAmount(format!(
                    "{}: {label} must be a finite value >= 0, got {value}",
                    self.code
                )));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "catalog_variants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub brand: String,
    pub model_name: String,
    pub code: String,
    pub description: String,
    pub units_per_carton: i32,
    pub length_cm: f64,
    pub width_cm: f64,
    pub height_cm: f64,
    pub unit_cost_foreign: f64,
    pub unit_cost_local: f64,
    pub price_standard: f64,
    pub price_online: f64,
    pub price_proposal: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for CatalogVariant {
    fn from(value: Model) -> Self {
        Self {
            id: value.id,
            brand: value.brand,
            model: value.model_name,
            code: value.code,
            description: value.description,
            packaging: Packaging {
                // Negative sizes are garbage; treat them like a missing size.
                units_per_carton: u32::try_from(value.units_per_carton).unwrap_or(0),
                length_cm: value.length_cm,
                width_cm: value.width_cm,
                height_cm: value.height_cm,
            },
            costs: UnitCosts {
                foreign: value.unit_cost_foreign,
                local: value.unit_cost_local,
            },
            prices: PriceTiers {
                standard: value.price_standard,
                online: value.price_online,
                proposal: value.price_proposal,
            },
        }
    }
}

impl From<&CatalogVariant> for ActiveModel {
    fn from(value: &CatalogVariant) -> Self {
        Self {
            id: ActiveValue::Set(value.id),
            brand: ActiveValue::Set(value.brand.clone()),
            model_name: ActiveValue::Set(value.model.clone()),
            code: ActiveValue::Set(value.code.clone()),
            description: ActiveValue::Set(value.description.clone()),
            units_per_carton: ActiveValue::Set(
                i32::try_from(value.packaging.units_per_carton).unwrap_or(i32::MAX),
            ),
            length_cm: ActiveValue::Set(value.packaging.length_cm),
            width_cm: ActiveValue::Set(value.packaging.width_cm),
            height_cm: ActiveValue::Set(value.packaging.height_cm),
            unit_cost_foreign: ActiveValue::Set(value.costs.foreign),
            unit_cost_local: ActiveValue::Set(value.costs.local),
            price_standard: ActiveValue::Set(value.prices.standard),
            price_online: ActiveValue::Set(value.prices.online),
            price_proposal: ActiveValue::Set(value.prices.proposal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_carton_size_divides_by_one() {
        let packaging = Packaging {
            units_per_carton: 0,
            ..Default::default()
        };
        assert_eq!(packaging.carton_size(), 1);
    }

    #[test]
    fn negative_carton_size_from_storage_is_unknown() {
        let model = Model {
            id: Uuid::new_v4(),
            brand: "Acme".to_string(),
            model_name: "X1".to_string(),
            code: "AC-X1".to_string(),
            description: String::new(),
            units_per_carton: -3,
            length_cm: 10.0,
            width_cm: 10.0,
            height_cm: 10.0,
            unit_cost_foreign: 1.0,
            unit_cost_local: 5.0,
            price_standard: 9.0,
            price_online: 8.0,
            price_proposal: 7.0,
        };
        let variant = CatalogVariant::from(model);
        assert_eq!(variant.packaging.units_per_carton, 0);
        assert_eq!(variant.packaging.carton_size(), 1);
        assert_eq!(variant.prices.price(PriceTier::Online), 8.0);
    }

    #[test]
    fn non_finite_or_negative_amounts_are_rejected() {
        let variant = CatalogVariant {
            id: Uuid::new_v4(),
            brand: "Acme".to_string(),
            model: "X1".to_string(),
            code: "AC-X1".to_string(),
            description: String::new(),
            packaging: Packaging {
                units_per_carton: 4,
                length_cm: 10.0,
                width_cm: 10.0,
                height_cm: 10.0,
            },
            costs: UnitCosts {
                foreign: 1.0,
                local: 0.0,
            },
            prices: PriceTiers {
                standard: 9.0,
                online: 8.0,
                proposal: 7.0,
            },
        };
        assert_eq!(variant.validate(), Ok(()));

        let mut infinite = variant.clone();
        infinite.costs.foreign = f64::INFINITY;
        assert!(matches!(infinite.validate(), Err(EngineError::InvalidAmount(_))));

        let mut nan = variant.clone();
        nan.packaging.height_cm = f64::NAN;
        assert!(matches!(nan.validate(), Err(EngineError::InvalidAmount(_))));

        let mut negative = variant;
        negative.prices.proposal = -1.0;
        assert_eq!(
            negative.validate(),
            Err(EngineError::InvalidAmount(
                "AC-X1: proposal price must be a finite value >= 0, got -1".to_string()
            ))
        );
    }
}
