//! The in-memory working set and its small state machine.
//!
//! A [`Worksheet`] owns the global tier selector, the control variables and
//! the ordered lines, and keeps the derived [`Computation`] in sync: every
//! mutation recomputes all rows from scratch.
//!
//! Save and load are split in two phases so that a caller holding the
//! worksheet behind a lock can release it while the store is busy:
//! `begin_*` validates and marks the operation in flight, `finish_*` applies
//! the outcome. A second save or load while one is in flight is refused with
//! [`EngineError::Busy`]; every other mutation is still allowed.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    catalog::CatalogVariant,
    controls::ControlVariables,
    derived::{Computation, DerivedRow, Totals, compute_derived_rows},
    order_line::{OrderLine, PriceTier},
    scenario::{SavedLine, Scenario, ScenarioDraft, ScenarioStore},
    util::normalize_required_name,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorksheetState {
    #[default]
    Empty,
    Editing,
    Saved,
    Loaded,
}

/// Persistence operation currently awaiting the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingIo {
    Save,
    Load,
}

impl PendingIo {
    const fn as_str(self) -> &'static str {
        match self {
            PendingIo::Save => "save",
            PendingIo::Load => "load",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Worksheet {
    state: WorksheetState,
    tier: PriceTier,
    controls: ControlVariables,
    lines: Vec<OrderLine>,
    computation: Computation,
    dirty: bool,
    in_flight: Option<PendingIo>,
    scenario_id: Option<Uuid>,
    /// Bumped on every edit.
    revision: u64,
    /// Revision snapshotted by the save or load in flight.
    pending_revision: u64,
}

impl Default for Worksheet {
    fn default() -> Self {
        Self::new()
    }
}

impl Worksheet {
    pub fn new() -> Self {
        let controls = ControlVariables::default();
        Self {
            state: WorksheetState::Empty,
            tier: PriceTier::default(),
            controls,
            lines: Vec::new(),
            computation: compute_derived_rows(&[], &controls),
            dirty: false,
            in_flight: None,
            scenario_id: None,
            revision: 0,
            pending_revision: 0,
        }
    }

    pub fn state(&self) -> WorksheetState {
        self.state
    }

    /// Global tier selector.
    pub fn tier(&self) -> PriceTier {
        self.tier
    }

    pub fn controls(&self) -> &ControlVariables {
        &self.controls
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn line(&self, line_id: Uuid) -> Option<&OrderLine> {
        self.lines.iter().find(|line| line.id == line_id)
    }

    pub fn computation(&self) -> &Computation {
        &self.computation
    }

    pub fn rows(&self) -> &[DerivedRow] {
        &self.computation.rows
    }

    pub fn totals(&self) -> &Totals {
        &self.computation.totals
    }

    /// Scenario last saved or loaded into this worksheet.
    pub fn scenario_id(&self) -> Option<Uuid> {
        self.scenario_id
    }

    pub fn in_flight(&self) -> Option<PendingIo> {
        self.in_flight
    }

    /// `true` when there are lines that were edited since the last save or
    /// load.
    pub fn has_unsaved_lines(&self) -> bool {
        self.dirty && !self.lines.is_empty()
    }

    /// Add a line for the selected variant, priced at the global tier.
    pub fn add_line(
        &mut self,
        variant: Option<&CatalogVariant>,
        quantity: u32,
    ) -> ResultEngine<Uuid> {
        let variant = variant.ok_or(EngineError::MissingSelection)?;
        let line = OrderLine::from_variant(variant, quantity, self.tier)?;
        let id = line.id;
        self.lines.push(line);
        self.touch();
        Ok(id)
    }

    pub fn remove_line(&mut self, line_id: Uuid) -> ResultEngine<()> {
        let index = self
            .lines
            .iter()
            .position(|line| line.id == line_id)
            .ok_or_else(|| EngineError::KeyNotFound(line_id.to_string()))?;
        self.lines.remove(index);
        self.touch();
        Ok(())
    }

    pub fn set_quantity(&mut self, line_id: Uuid, quantity: u32) -> ResultEngine<()> {
        self.line_mut(line_id)?.set_quantity(quantity)?;
        self.touch();
        Ok(())
    }

    /// Type a price on one line; it becomes a manual price.
    pub fn set_manual_price(&mut self, line_id: Uuid, price: f64) -> ResultEngine<()> {
        self.line_mut(line_id)?.set_manual_price(price)?;
        self.touch();
        Ok(())
    }

    /// Switch the global tier. Every line is re-priced, manual prices
    /// included.
    pub fn switch_tier(&mut self, tier: PriceTier) {
        self.tier = tier;
        for line in &mut self.lines {
            line.apply_tier(tier);
        }
        self.touch();
    }

    pub fn set_controls(&mut self, controls: ControlVariables) -> ResultEngine<()> {
        controls.validate()?;
        self.controls = controls;
        self.touch();
        Ok(())
    }

    /// Drop every line and restore the default controls.
    ///
    /// Needs `confirmed` when there is anything to lose.
    pub fn reset(&mut self, confirmed: bool) -> ResultEngine<()> {
        if !self.lines.is_empty() && !confirmed {
            return Err(EngineError::ConfirmationRequired(format!(
                "reset discards {} line(s)",
                self.lines.len()
            )));
        }
        self.lines.clear();
        self.controls = ControlVariables::default();
        self.revision += 1;
        self.dirty = false;
        self.scenario_id = None;
        self.state = WorksheetState::Empty;
        self.recompute();
        Ok(())
    }

    /// First phase of a save: validate the name and snapshot the working set.
    pub fn begin_save(&mut self, name: &str) -> ResultEngine<ScenarioDraft> {
        self.ensure_idle()?;
        let name = normalize_required_name(name, "scenario")?;
        self.in_flight = Some(PendingIo::Save);
        self.pending_revision = self.revision;

        Ok(ScenarioDraft {
            name,
            controls: self.controls,
            lines: self.lines.iter().map(SavedLine::from).collect(),
        })
    }

    /// Second phase of a save. A failure only clears the in-flight flag.
    ///
    /// Edits made while the save was in flight keep the worksheet dirty.
    pub fn finish_save(&mut self, outcome: ResultEngine<Uuid>) -> ResultEngine<Uuid> {
        self.in_flight = None;
        let id = outcome?;
        self.scenario_id = Some(id);
        if self.revision == self.pending_revision {
            self.dirty = false;
            self.state = WorksheetState::Saved;
        }
        Ok(id)
    }

    /// First phase of a load: refuse to drop unsaved lines unless confirmed.
    pub fn begin_load(&mut self, confirmed: bool) -> ResultEngine<()> {
        self.ensure_idle()?;
        if self.has_unsaved_lines() && !confirmed {
            return Err(EngineError::ConfirmationRequired(format!(
                "loading discards {} unsaved line(s)",
                self.lines.len()
            )));
        }
        self.in_flight = Some(PendingIo::Load);
        self.pending_revision = self.revision;
        Ok(())
    }

    /// Second phase of a load: replace controls and lines wholesale.
    ///
    /// On failure the previous working set is left as it was. Lines edited
    /// while the load was in flight were never confirmed away, so they make
    /// the load fail with `ConfirmationRequired`.
    pub fn finish_load(&mut self, outcome: ResultEngine<Scenario>) -> ResultEngine<()> {
        self.in_flight = None;
        let scenario = outcome?;
        if self.revision != self.pending_revision && self.has_unsaved_lines() {
            return Err(EngineError::ConfirmationRequired(format!(
                "{} line(s) were edited while loading",
                self.lines.len()
            )));
        }

        let lines = scenario
            .lines
            .into_iter()
            .map(|saved| {
                OrderLine::restored(
                    saved.variant,
                    saved.quantity,
                    saved.target_price,
                    saved.captured,
                )
            })
            .collect::<ResultEngine<Vec<_>>>()?;

        self.controls = scenario.controls;
        self.lines = lines;
        self.scenario_id = Some(scenario.id);
        self.dirty = false;
        self.state = WorksheetState::Loaded;
        self.recompute();
        Ok(())
    }

    /// Save the working set as a new scenario.
    ///
    /// Dropping the returned future before it completes clears the in-flight
    /// flag and keeps the lines unsaved.
    pub async fn save<S: ScenarioStore>(&mut self, store: &S, name: &str) -> ResultEngine<Uuid> {
        let draft = self.begin_save(name)?;
        let guard = PendingGuard::new(self);
        let outcome = store.save_scenario(&draft).await;
        guard.complete(|worksheet| worksheet.finish_save(outcome))
    }

    /// Replace the working set with a saved scenario.
    pub async fn load<S: ScenarioStore>(
        &mut self,
        store: &S,
        scenario_id: Uuid,
        confirmed: bool,
    ) -> ResultEngine<()> {
        self.begin_load(confirmed)?;
        let guard = PendingGuard::new(self);
        let outcome = store.load_scenario(scenario_id).await;
        guard.complete(|worksheet| worksheet.finish_load(outcome))
    }

    fn ensure_idle(&self) -> ResultEngine<()> {
        match self.in_flight {
            Some(pending) => Err(EngineError::Busy(pending.as_str().to_string())),
            None => Ok(()),
        }
    }

    fn line_mut(&mut self, line_id: Uuid) -> ResultEngine<&mut OrderLine> {
        self.lines
            .iter_mut()
            .find(|line| line.id == line_id)
            .ok_or_else(|| EngineError::KeyNotFound(line_id.to_string()))
    }

    fn touch(&mut self) {
        self.revision += 1;
        self.dirty = true;
        self.state = if self.lines.is_empty() {
            WorksheetState::Empty
        } else {
            WorksheetState::Editing
        };
        self.recompute();
    }

    fn recompute(&mut self) {
        self.computation = compute_derived_rows(&self.lines, &self.controls);
    }
}

/// Clears the in-flight flag if a save or load is abandoned mid-way.
struct PendingGuard<'a> {
    worksheet: &'a mut Worksheet,
    armed: bool,
}

impl<'a> PendingGuard<'a> {
    fn new(worksheet: &'a mut Worksheet) -> Self {
        Self {
            worksheet,
            armed: true,
        }
    }

    fn complete<T>(mut self, finish: impl FnOnce(&mut Worksheet) -> T) -> T {
        self.armed = false;
        finish(&mut *self.worksheet)
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            if let Some(pending) = self.worksheet.in_flight.take() {
                tracing::warn!(operation = pending.as_str(), "abandoned before completion");
            }
        }
    }
}
