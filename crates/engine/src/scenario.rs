//! Saved scenarios and the persistence seam of the worksheet.
//!
//! A scenario is a named copy of the control variables and of the lines of a
//! worksheet. Scenarios are never updated: every save inserts a new record.

use std::future::Future;

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    ResultEngine,
    catalog::{CatalogVariant, PriceTiers},
    controls::ControlVariables,
    order_line::OrderLine,
};

/// A line as it is persisted: the tier label is deliberately left out.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedLine {
    pub variant: CatalogVariant,
    pub quantity: u32,
    pub target_price: f64,
    pub captured: PriceTiers,
}

impl From<&OrderLine> for SavedLine {
    fn from(value: &OrderLine) -> Self {
        Self {
            variant: value.variant.clone(),
            quantity: value.quantity,
            target_price: value.target_price,
            captured: value.captured,
        }
    }
}

/// What the worksheet hands to the store on save.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioDraft {
    pub name: String,
    pub controls: ControlVariables,
    pub lines: Vec<SavedLine>,
}

/// A scenario fetched back from the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub controls: ControlVariables,
    pub lines: Vec<SavedLine>,
}

/// Entry of the saved-scenario picker.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub line_count: u64,
}

/// Persistence used by the worksheet.
///
/// `save_scenario` always inserts; `delete_scenario` succeeds when the
/// scenario is already gone; `load_scenario` fails with `KeyNotFound` for an
/// unknown id.
pub trait ScenarioStore {
    fn save_scenario(&self, draft: &ScenarioDraft)
    -> impl Future<Output = ResultEngine<Uuid>> + Send;

    fn load_scenario(&self, id: Uuid) -> impl Future<Output = ResultEngine<Scenario>> + Send;

    fn delete_scenario(&self, id: Uuid) -> impl Future<Output = ResultEngine<()>> + Send;

    fn list_saved_scenarios(&self)
    -> impl Future<Output = ResultEngine<Vec<ScenarioSummary>>> + Send;
}

/// Read-only access to the purchasable catalog.
pub trait CatalogSource {
    fn list_purchasable_variants(
        &self,
    ) -> impl Future<Output = ResultEngine<Vec<CatalogVariant>>> + Send;
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "scenarios")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTimeUtc,
    pub exchange_rate: f64,
    pub ocean_lump_sum: f64,
    pub trucking_lump_sum: f64,
    pub duty_exempt: bool,
    pub manual_duty_percent: f64,
    pub consumable_fee_per_unit: f64,
    pub license_fee_per_unit: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::scenario_lines::Entity")]
    Lines,
}

impl Related<super::scenario_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub(crate) fn controls(&self) -> ControlVariables {
        ControlVariables {
            exchange_rate: self.exchange_rate,
            ocean_lump_sum: self.ocean_lump_sum,
            trucking_lump_sum: self.trucking_lump_sum,
            duty_exempt: self.duty_exempt,
            manual_duty_percent: self.manual_duty_percent,
            consumable_fee_per_unit: self.consumable_fee_per_unit,
            license_fee_per_unit: self.license_fee_per_unit,
        }
    }
}

impl ActiveModel {
    pub(crate) fn new(id: Uuid, draft: &ScenarioDraft, created_at: DateTime<Utc>) -> Self {
        let controls = &draft.controls;
        Self {
            id: ActiveValue::Set(id),
            name: ActiveValue::Set(draft.name.clone()),
            created_at: ActiveValue::Set(created_at),
            exchange_rate: ActiveValue::Set(controls.exchange_rate),
            ocean_lump_sum: ActiveValue::Set(controls.ocean_lump_sum),
            trucking_lump_sum: ActiveValue::Set(controls.trucking_lump_sum),
            duty_exempt: ActiveValue::Set(controls.duty_exempt),
            manual_duty_percent: ActiveValue::Set(controls.manual_duty_percent),
            consumable_fee_per_unit: ActiveValue::Set(controls.consumable_fee_per_unit),
            license_fee_per_unit: ActiveValue::Set(controls.license_fee_per_unit),
        }
    }
}
