use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Global price tier of a worksheet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceTier {
    #[default]
    Standard,
    Online,
    Proposal,
}

pub mod worksheet {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SessionCreated {
        pub session_id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LineNew {
        /// Catalog variant to add. Missing means nothing was selected.
        pub variant_id: Option<Uuid>,
        pub quantity: u32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LineCreated {
        pub line_id: Uuid,
    }

    /// Edit of one line. Setting `target_price` turns it into a manual price.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct LineUpdate {
        pub quantity: Option<u32>,
        pub target_price: Option<f64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TierSwitch {
        pub tier: PriceTier,
    }

    /// Partial update of the control variables; missing fields keep their
    /// current value.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ControlsUpdate {
        pub exchange_rate: Option<f64>,
        pub ocean_lump_sum: Option<f64>,
        pub trucking_lump_sum: Option<f64>,
        pub duty_exempt: Option<bool>,
        pub manual_duty_percent: Option<f64>,
        pub consumable_fee_per_unit: Option<f64>,
        pub license_fee_per_unit: Option<f64>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct Reset {
        #[serde(default)]
        pub confirm: bool,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct PrintQuery {
        pub title: Option<String>,
    }
}

pub mod scenario {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ScenarioSave {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ScenarioSaved {
        pub id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ScenarioLoad {
        pub scenario_id: Uuid,
        /// Required when the worksheet holds unsaved lines.
        #[serde(default)]
        pub confirm: bool,
    }
}
