use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::run_with_listener;

mod catalog;
mod scenarios;
mod server;
mod sessions;
mod worksheet;

pub mod types {
    pub mod worksheet {
        pub use crate::worksheet::WorksheetView;
        pub use api_types::worksheet::{
            ControlsUpdate, LineCreated, LineNew, LineUpdate, PrintQuery, Reset, SessionCreated,
            TierSwitch,
        };
    }

    pub mod scenario {
        pub use api_types::scenario::{ScenarioLoad, ScenarioSave, ScenarioSaved};
        pub use engine::ScenarioSummary;
    }

    pub mod catalog {
        pub use engine::CatalogVariant;
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ConfirmationRequired(_) | EngineError::Busy(_) => StatusCode::CONFLICT,
        EngineError::MissingName(_)
        | EngineError::MissingSelection
        | EngineError::InvalidQuantity(_)
        | EngineError::InvalidAmount(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::Storage(_) | EngineError::Export(_) | EngineError::Database(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    if err.is_storage() {
        // Storage failures are shown as they are; the user retries by hand.
        tracing::error!("storage error: {err}");
    }
    err.to_string()
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
