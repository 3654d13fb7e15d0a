use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{FromQueryResult, QueryOrder, QuerySelect, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    scenario::{self, SavedLine, Scenario, ScenarioDraft, ScenarioStore, ScenarioSummary},
    scenario_lines,
};

use super::{Engine, with_tx};

#[derive(Debug, FromQueryResult)]
struct LineCount {
    scenario_id: Uuid,
    count: i64,
}

impl Engine {
    /// Persist a draft as a brand new scenario (header and lines in one
    /// transaction).
    pub async fn save_scenario(&self, draft: &ScenarioDraft) -> ResultEngine<Uuid> {
        let scenario_id = Uuid::new_v4();
        let header = scenario::ActiveModel::new(scenario_id, draft, Utc::now());
        let lines = draft
            .lines
            .iter()
            .enumerate()
            .map(|(position, line)| {
                let position = i32::try_from(position)
                    .map_err(|_| EngineError::Storage("too many lines".to_string()))?;
                scenario_lines::ActiveModel::new(scenario_id, position, line)
            })
            .collect::<ResultEngine<Vec<_>>>()?;

        with_tx!(self, |db_tx| {
            header.insert(&db_tx).await?;
            if !lines.is_empty() {
                scenario_lines::Entity::insert_many(lines)
                    .exec(&db_tx)
                    .await?;
            }
            Ok::<_, EngineError>(())
        })?;

        tracing::info!(
            scenario = %scenario_id,
            name = %draft.name,
            lines = draft.lines.len(),
            "scenario saved"
        );
        Ok(scenario_id)
    }

    /// Fetch a saved scenario with its lines in their saved order.
    pub async fn load_scenario(&self, scenario_id: Uuid) -> ResultEngine<Scenario> {
        let header = scenario::Entity::find_by_id(scenario_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(scenario_id.to_string()))?;

        let lines = scenario_lines::Entity::find()
            .filter(scenario_lines::Column::ScenarioId.eq(scenario_id))
            .order_by_asc(scenario_lines::Column::Position)
            .all(&self.database)
            .await?
            .into_iter()
            .map(SavedLine::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;

        let controls = header.controls();
        controls.validate().map_err(|err| {
            EngineError::Storage(format!("scenario {scenario_id} has invalid controls: {err}"))
        })?;

        tracing::debug!(scenario = %scenario_id, lines = lines.len(), "scenario loaded");
        Ok(Scenario {
            id: header.id,
            name: header.name,
            created_at: header.created_at,
            controls,
            lines,
        })
    }

    /// Delete a scenario and its lines. Deleting a missing scenario is a no-op.
    pub async fn delete_scenario(&self, scenario_id: Uuid) -> ResultEngine<()> {
        let removed = with_tx!(self, |db_tx| {
            scenario_lines::Entity::delete_many()
                .filter(scenario_lines::Column::ScenarioId.eq(scenario_id))
                .exec(&db_tx)
                .await?;
            let result = scenario::Entity::delete_by_id(scenario_id)
                .exec(&db_tx)
                .await?;
            Ok::<_, EngineError>(result.rows_affected)
        })?;

        if removed == 0 {
            tracing::debug!(scenario = %scenario_id, "scenario already absent");
        } else {
            tracing::info!(scenario = %scenario_id, "scenario deleted");
        }
        Ok(())
    }

    /// Saved scenarios, newest first.
    pub async fn list_saved_scenarios(&self) -> ResultEngine<Vec<ScenarioSummary>> {
        let headers = scenario::Entity::find()
            .order_by_desc(scenario::Column::CreatedAt)
            .order_by_asc(scenario::Column::Name)
            .all(&self.database)
            .await?;

        let counts: HashMap<Uuid, i64> = scenario_lines::Entity::find()
            .select_only()
            .column(scenario_lines::Column::ScenarioId)
            .column_as(scenario_lines::Column::Id.count(), "count")
            .group_by(scenario_lines::Column::ScenarioId)
            .into_model::<LineCount>()
            .all(&self.database)
            .await?
            .into_iter()
            .map(|row| (row.scenario_id, row.count))
            .collect();

        Ok(headers
            .into_iter()
            .map(|header| ScenarioSummary {
                line_count: counts
                    .get(&header.id)
                    .copied()
                    .and_then(|count| u64::try_from(count).ok())
                    .unwrap_or(0),
                id: header.id,
                name: header.name,
                created_at: header.created_at,
            })
            .collect())
    }
}

impl ScenarioStore for Engine {
    async fn save_scenario(&self, draft: &ScenarioDraft) -> ResultEngine<Uuid> {
        Engine::save_scenario(self, draft).await
    }

    async fn load_scenario(&self, id: Uuid) -> ResultEngine<Scenario> {
        Engine::load_scenario(self, id).await
    }

    async fn delete_scenario(&self, id: Uuid) -> ResultEngine<()> {
        Engine::delete_scenario(self, id).await
    }

    async fn list_saved_scenarios(&self) -> ResultEngine<Vec<ScenarioSummary>> {
        Engine::list_saved_scenarios(self).await
    }
}
