//! Live worksheets, one per session.

use std::{collections::HashMap, sync::Arc};

use engine::{EngineError, Worksheet};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::ServerError;

pub type SharedWorksheet = Arc<Mutex<Worksheet>>;

#[derive(Clone, Default)]
pub struct Sessions {
    inner: Arc<RwLock<HashMap<Uuid, SharedWorksheet>>>,
}

impl Sessions {
    /// Open a session holding an empty worksheet.
    pub async fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.inner
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(Worksheet::new())));
        tracing::debug!(session = %id, "session opened");
        id
    }

    pub async fn get(&self, id: Uuid) -> Result<SharedWorksheet, ServerError> {
        self.inner
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| EngineError::KeyNotFound(format!("session {id}")).into())
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), ServerError> {
        match self.inner.write().await.remove(&id) {
            Some(_) => {
                tracing::debug!(session = %id, "session closed");
                Ok(())
            }
            None => Err(EngineError::KeyNotFound(format!("session {id}")).into()),
        }
    }
}
