//! Landed cost worksheet engine.
//!
//! A basket of [`OrderLine`]s plus a set of [`ControlVariables`] goes through
//! [`compute_derived_rows`], which derives volumes, allocates shared costs and
//! evaluates margins. [`Worksheet`] holds the live basket and its state, and
//! [`Engine`] persists catalog variants and saved scenarios.

pub use allocation::{
    Allocation, AllocationInput, AllocationTotals, LineCosts, TAX_RATE, allocate,
    convert_unit_cost,
};
pub use catalog::{CatalogVariant, Packaging, PriceTiers, UnitCosts};
pub use controls::ControlVariables;
pub use currency::{Currency, CurrencyPair};
pub use derived::{Computation, DerivedRow, Totals, compute_derived_rows};
pub use error::EngineError;
pub use export::{export_csv, render_print};
pub use margin::{LOW_MARGIN_THRESHOLD_PERCENT, Margin, evaluate, margin_percent};
pub use ops::{Engine, EngineBuilder};
pub use order_line::{OrderLine, PriceTier, TierLabel};
pub use report::{ShipmentLine, ShipmentReport, shipment_report};
pub use scenario::{
    CatalogSource, SavedLine, Scenario, ScenarioDraft, ScenarioStore, ScenarioSummary,
};
pub use volume::{VolumeFigures, ceil_cartons, derive_volume, unit_volume_m3};
pub use worksheet::{PendingIo, Worksheet, WorksheetState};

mod allocation;
mod catalog;
mod controls;
mod currency;
mod derived;
mod error;
mod export;
mod margin;
mod ops;
mod order_line;
mod report;
mod scenario;
mod scenario_lines;
mod util;
mod volume;
mod worksheet;

pub type ResultEngine<T> = Result<T, EngineError>;
