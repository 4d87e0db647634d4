//! Draft store

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use voice_command_core::{Draft, DraftStore, Result};

#[derive(Default)]
pub struct InMemoryDraftStore {
    drafts: RwLock<HashMap<Uuid, Draft>>,
}

impl InMemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.drafts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.read().is_empty()
    }
}

#[async_trait]
impl DraftStore for InMemoryDraftStore {
    async fn save_draft(&self, draft: &Draft) -> Result<()> {
        self.drafts.write().insert(draft.id, draft.clone());
        tracing::debug!(draft_id = %draft.id, status = %draft.status, "Draft saved");
        Ok(())
    }

    async fn load_draft(&self, id: Uuid) -> Result<Option<Draft>> {
        Ok(self.drafts.read().get(&id).cloned())
    }
}
