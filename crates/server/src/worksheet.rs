//! Worksheet session API endpoints

use api_types::{
    PriceTier as ApiTier,
    scenario::{ScenarioLoad, ScenarioSave, ScenarioSaved},
    worksheet::{
        ControlsUpdate, LineCreated, LineNew, LineUpdate, PrintQuery, Reset, SessionCreated,
        TierSwitch,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use engine::{
    ControlVariables, DerivedRow, EngineError, PendingIo, PriceTier, ScenarioDraft,
    ScenarioStore, ShipmentReport, Totals, Worksheet, WorksheetState,
};
use std::sync::Arc;
use serde::Serialize;
use uuid::Uuid;

use crate::{ServerError, server::ServerState, sessions::SharedWorksheet};

const DEFAULT_PRINT_TITLE: &str = "Landed cost worksheet";

/// Everything a client needs to render the worksheet.
#[derive(Debug, Serialize)]
pub struct WorksheetView {
    pub session_id: Uuid,
    pub state: WorksheetState,
    pub tier: PriceTier,
    pub controls: ControlVariables,
    pub scenario_id: Option<Uuid>,
    pub in_flight: Option<PendingIo>,
    pub unsaved: bool,
    pub rows: Vec<DerivedRow>,
    pub totals: Totals,
}

impl WorksheetView {
    fn new(session_id: Uuid, worksheet: &Worksheet) -> Self {
        Self {
            session_id,
            state: worksheet.state(),
            tier: worksheet.tier(),
            controls: *worksheet.controls(),
            scenario_id: worksheet.scenario_id(),
            in_flight: worksheet.in_flight(),
            unsaved: worksheet.has_unsaved_lines(),
            rows: worksheet.rows().to_vec(),
            totals: *worksheet.totals(),
        }
    }
}

fn map_tier(tier: ApiTier) -> PriceTier {
    match tier {
        ApiTier::Standard => PriceTier::Standard,
        ApiTier::Online => PriceTier::Online,
        ApiTier::Proposal => PriceTier::Proposal,
    }
}

fn merge_controls(current: ControlVariables, update: ControlsUpdate) -> ControlVariables {
    ControlVariables {
        exchange_rate: update.exchange_rate.unwrap_or(current.exchange_rate),
        ocean_lump_sum: update.ocean_lump_sum.unwrap_or(current.ocean_lump_sum),
        trucking_lump_sum: update.trucking_lump_sum.unwrap_or(current.trucking_lump_sum),
        duty_exempt: update.duty_exempt.unwrap_or(current.duty_exempt),
        manual_duty_percent: update
            .manual_duty_percent
            .unwrap_or(current.manual_duty_percent),
        consumable_fee_per_unit: update
            .consumable_fee_per_unit
            .unwrap_or(current.consumable_fee_per_unit),
        license_fee_per_unit: update
            .license_fee_per_unit
            .unwrap_or(current.license_fee_per_unit),
    }
}

/// Handle requests for opening a new worksheet session
pub async fn session_new(State(state): State<ServerState>) -> (StatusCode, Json<SessionCreated>) {
    let session_id = state.sessions.create().await;
    (StatusCode::CREATED, Json(SessionCreated { session_id }))
}

pub async fn session_get(
    Path(session_id): Path<Uuid>,
    State(state): State<ServerState>,
) -> Result<Json<WorksheetView>, ServerError> {
    let worksheet = state.sessions.get(session_id).await?;
    let worksheet = worksheet.lock().await;
    Ok(Json(WorksheetView::new(session_id, &worksheet)))
}

pub async fn session_delete(
    Path(session_id): Path<Uuid>,
    State(state): State<ServerState>,
) -> Result<StatusCode, ServerError> {
    state.sessions.remove(session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handle requests for adding a line from the catalog
pub async fn line_new(
    Path(session_id): Path<Uuid>,
    State(state): State<ServerState>,
    Json(payload): Json<LineNew>,
) -> Result<(StatusCode, Json<LineCreated>), ServerError> {
    let worksheet = state.sessions.get(session_id).await?;
    let variant = match payload.variant_id {
        Some(variant_id) => Some(
            state
                .engine
                .catalog_variant(variant_id)
                .await?
                .ok_or_else(|| engine::EngineError::KeyNotFound(variant_id.to_string()))?,
        ),
        None => None,
    };

    let line_id = worksheet
        .lock()
        .await
        .add_line(variant.as_ref(), payload.quantity)?;
    Ok((StatusCode::CREATED, Json(LineCreated { line_id })))
}

/// Handle requests for editing quantity and/or price of a line
///
/// Both edits are applied or neither is.
pub async fn line_update(
    Path((session_id, line_id)): Path<(Uuid, Uuid)>,
    State(state): State<ServerState>,
    Json(payload): Json<LineUpdate>,
) -> Result<Json<WorksheetView>, ServerError> {
    if payload.quantity.is_none() && payload.target_price.is_none() {
        return Err(ServerError::Generic(
            "quantity or target_price required".to_string(),
        ));
    }

    let worksheet = state.sessions.get(session_id).await?;
    let mut worksheet = worksheet.lock().await;
    let mut edited = worksheet.clone();
    if let Some(quantity) = payload.quantity {
        edited.set_quantity(line_id, quantity)?;
    }
    if let Some(price) = payload.target_price {
        edited.set_manual_price(line_id, price)?;
    }
    *worksheet = edited;
    Ok(Json(WorksheetView::new(session_id, &worksheet)))
}

pub async fn line_delete(
    Path((session_id, line_id)): Path<(Uuid, Uuid)>,
    State(state): State<ServerState>,
) -> Result<Json<WorksheetView>, ServerError> {
    let worksheet = state.sessions.get(session_id).await?;
    let mut worksheet = worksheet.lock().await;
    worksheet.remove_line(line_id)?;
    Ok(Json(WorksheetView::new(session_id, &worksheet)))
}

/// Handle requests for switching the global price tier
pub async fn tier_switch(
    Path(session_id): Path<Uuid>,
    State(state): State<ServerState>,
    Json(payload): Json<TierSwitch>,
) -> Result<Json<WorksheetView>, ServerError> {
    let worksheet = state.sessions.get(session_id).await?;
    let mut worksheet = worksheet.lock().await;
    worksheet.switch_tier(map_tier(payload.tier));
    Ok(Json(WorksheetView::new(session_id, &worksheet)))
}

pub async fn controls_update(
    Path(session_id): Path<Uuid>,
    State(state): State<ServerState>,
    Json(payload): Json<ControlsUpdate>,
) -> Result<Json<WorksheetView>, ServerError> {
    let worksheet = state.sessions.get(session_id).await?;
    let mut worksheet = worksheet.lock().await;
    let controls = merge_controls(*worksheet.controls(), payload);
    worksheet.set_controls(controls)?;
    Ok(Json(WorksheetView::new(session_id, &worksheet)))
}

pub async fn reset(
    Path(session_id): Path<Uuid>,
    State(state): State<ServerState>,
    Json(payload): Json<Reset>,
) -> Result<Json<WorksheetView>, ServerError> {
    let worksheet = state.sessions.get(session_id).await?;
    let mut worksheet = worksheet.lock().await;
    worksheet.reset(payload.confirm)?;
    Ok(Json(WorksheetView::new(session_id, &worksheet)))
}

/// Store the draft and apply the outcome on a task of its own.
///
/// The task outlives the request, so a client going away mid-save still
/// clears the in-flight flag.
async fn save_detached<S>(
    store: Arc<S>,
    worksheet: SharedWorksheet,
    draft: ScenarioDraft,
) -> Result<Uuid, EngineError>
where
    S: ScenarioStore + Send + Sync + 'static,
{
    let task = tokio::spawn(async move {
        let outcome = store.save_scenario(&draft).await;
        worksheet.lock().await.finish_save(outcome)
    });
    task.await
        .map_err(|err| EngineError::Storage(format!("save task failed: {err}")))?
}

/// Same as [`save_detached`], for loads.
async fn load_detached<S>(
    store: Arc<S>,
    worksheet: SharedWorksheet,
    scenario_id: Uuid,
) -> Result<(), EngineError>
where
    S: ScenarioStore + Send + Sync + 'static,
{
    let task = tokio::spawn(async move {
        let outcome = store.load_scenario(scenario_id).await;
        worksheet.lock().await.finish_load(outcome)
    });
    task.await
        .map_err(|err| EngineError::Storage(format!("load task failed: {err}")))?
}

/// Handle requests for saving the worksheet as a new scenario
///
/// The session lock is released while the store works, so the worksheet
/// stays editable.
pub async fn save(
    Path(session_id): Path<Uuid>,
    State(state): State<ServerState>,
    Json(payload): Json<ScenarioSave>,
) -> Result<(StatusCode, Json<ScenarioSaved>), ServerError> {
    let worksheet = state.sessions.get(session_id).await?;
    let draft = worksheet.lock().await.begin_save(&payload.name)?;
    let id = save_detached(state.engine.clone(), worksheet, draft).await?;
    Ok((StatusCode::CREATED, Json(ScenarioSaved { id })))
}

/// Handle requests for replacing the worksheet with a saved scenario
pub async fn load(
    Path(session_id): Path<Uuid>,
    State(state): State<ServerState>,
    Json(payload): Json<ScenarioLoad>,
) -> Result<Json<WorksheetView>, ServerError> {
    let worksheet = state.sessions.get(session_id).await?;
    worksheet.lock().await.begin_load(payload.confirm)?;
    load_detached(state.engine.clone(), worksheet.clone(), payload.scenario_id).await?;
    let worksheet = worksheet.lock().await;
    Ok(Json(WorksheetView::new(session_id, &worksheet)))
}

pub async fn export_csv(
    Path(session_id): Path<Uuid>,
    State(state): State<ServerState>,
) -> Result<impl IntoResponse, ServerError> {
    let worksheet = state.sessions.get(session_id).await?;
    let data = engine::export_csv(worksheet.lock().await.computation())?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"worksheet.csv\"",
            ),
        ],
        data,
    ))
}

pub async fn print(
    Path(session_id): Path<Uuid>,
    Query(query): Query<PrintQuery>,
    State(state): State<ServerState>,
) -> Result<impl IntoResponse, ServerError> {
    let worksheet = state.sessions.get(session_id).await?;
    let worksheet = worksheet.lock().await;
    let title = query
        .title
        .as_deref()
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .unwrap_or(DEFAULT_PRINT_TITLE);
    let text = engine::render_print(
        title,
        worksheet.computation(),
        worksheet.controls(),
        state.currencies,
    )?;
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text))
}

/// Read-only shipment report: whole cartons per line
pub async fn shipment(
    Path(session_id): Path<Uuid>,
    State(state): State<ServerState>,
) -> Result<Json<ShipmentReport>, ServerError> {
    let worksheet = state.sessions.get(session_id).await?;
    let report = engine::shipment_report(worksheet.lock().await.lines());
    Ok(Json(report))
}
