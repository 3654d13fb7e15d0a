//! Saved scenario API endpoints

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::ScenarioSummary;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

/// Saved scenarios, newest first
pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<Vec<ScenarioSummary>>, ServerError> {
    Ok(Json(state.engine.list_saved_scenarios().await?))
}

/// Delete a saved scenario. Deleting a missing one is not an error.
pub async fn delete(
    Path(scenario_id): Path<Uuid>,
    State(state): State<ServerState>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_scenario(scenario_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
