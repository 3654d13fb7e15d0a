//! Catalog API endpoints

use axum::{Json, extract::State};
use engine::CatalogVariant;

use crate::{ServerError, server::ServerState};

/// Handle requests for listing the purchasable variants
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<CatalogVariant>>, ServerError> {
    Ok(Json(state.engine.list_purchasable_variants().await?))
}
