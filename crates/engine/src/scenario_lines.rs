//! Lines of a saved scenario, in worksheet order.

use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    catalog::{CatalogVariant, Packaging, PriceTiers, UnitCosts},
    scenario::SavedLine,
};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "scenario_lines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub scenario_id: Uuid,
    pub position: i32,
    pub variant_id: Uuid,
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
    pub quantity: i32,
    pub target_price: f64,
    pub captured_standard: f64,
    pub captured_online: f64,
    pub captured_proposal: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::scenario::Entity",
        from = "Column::ScenarioId",
        to = "super::scenario::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Scenario,
}

impl Related<super::scenario::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Scenario.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn new(scenario_id: Uuid, position: i32, line: &SavedLine) -> ResultEngine<Self> {
        let variant = &line.variant;
        let quantity = i32::try_from(line.quantity)
            .map_err(|_| EngineError::InvalidQuantity(format!("{} is too large", line.quantity)))?;
        let units_per_carton = i32::try_from(variant.packaging.units_per_carton).map_err(|_| {
            EngineError::InvalidQuantity(format!(
                "{} units per carton is too large",
                variant.packaging.units_per_carton
            ))
        })?;

        Ok(Self {
            id: ActiveValue::Set(Uuid::new_v4()),
            scenario_id: ActiveValue::Set(scenario_id),
            position: ActiveValue::Set(position),
            variant_id: ActiveValue::Set(variant.id),
            brand: ActiveValue::Set(variant.brand.clone()),
            model_name: ActiveValue::Set(variant.model.clone()),
            code: ActiveValue::Set(variant.code.clone()),
            description: ActiveValue::Set(variant.description.clone()),
            units_per_carton: ActiveValue::Set(units_per_carton),
            length_cm: ActiveValue::Set(variant.packaging.length_cm),
            width_cm: ActiveValue::Set(variant.packaging.width_cm),
            height_cm: ActiveValue::Set(variant.packaging.height_cm),
            unit_cost_foreign: ActiveValue::Set(variant.costs.foreign),
            unit_cost_local: ActiveValue::Set(variant.costs.local),
            quantity: ActiveValue::Set(quantity),
            target_price: ActiveValue::Set(line.target_price),
            captured_standard: ActiveValue::Set(line.captured.standard),
            captured_online: ActiveValue::Set(line.captured.online),
            captured_proposal: ActiveValue::Set(line.captured.proposal),
        })
    }
}

impl TryFrom<Model> for SavedLine {
    type Error = EngineError;

    fn try_from(value: Model) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(value.quantity)
            .ok()
            .filter(|quantity| *quantity > 0)
            .ok_or_else(|| {
                EngineError::Storage(format!(
                    "scenario line {} has invalid quantity {}",
                    value.id, value.quantity
                ))
            })?;
        let captured = PriceTiers {
            standard: value.captured_standard,
            online: value.captured_online,
            proposal: value.captured_proposal,
        };

        Ok(Self {
            variant: CatalogVariant {
                id: value.variant_id,
                brand: value.brand,
                model: value.model_name,
                code: value.code,
                description: value.description,
                packaging: Packaging {
                    units_per_carton: u32::try_from(value.units_per_carton).unwrap_or(0),
                    length_cm: value.length_cm,
                    width_cm: value.width_cm,
                    height_cm: value.height_cm,
                },
                costs: UnitCosts {
                    foreign: value.unit_cost_foreign,
                    local: value.unit_cost_local,
                },
                prices: captured,
            },
            quantity,
            target_price: value.target_price,
            captured,
        })
    }
}
