//! In-process store used for development and tests.

use crate::domain::{Entity, Prompt, Thought, ThoughtStatus};
use crate::persistence::{NoteStore, StoreError, StoreResult};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct MemoryStore {
    entities: RwLock<HashMap<Uuid, Entity>>,
    // Prompt versions are computed under this lock, so appends never race.
    prompts: RwLock<Vec<Prompt>>,
    thoughts: RwLock<HashMap<Uuid, Thought>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn latest_version(prompts: &[Prompt], owner_id: &str) -> Option<i64> {
    prompts
        .iter()
        .filter(|p| p.owner_id == owner_id)
        .map(|p| p.version)
        .max()
}

#[async_trait]
impl NoteStore for MemoryStore {
    async fn insert_entity(&self, entity: &Entity) -> StoreResult<()> {
        self.entities
            .write()
            .await
            .insert(entity.id, entity.clone());
        Ok(())
    }

    async fn get_entity(&self, id: Uuid) -> StoreResult<Option<Entity>> {
        Ok(self.entities.read().await.get(&id).cloned())
    }

    async fn list_entities(&self, owner_id: &str) -> StoreResult<Vec<Entity>> {
        let mut entities: Vec<Entity> = self
            .entities
            .read()
            .await
            .values()
            .filter(|e| e.owner_id == owner_id)
            .cloned()
            .collect();
        entities.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        Ok(entities)
    }

    async fn delete_entity(&self, id: Uuid) -> StoreResult<()> {
        match self.entities.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(id)),
        }
    }

    async fn latest_prompt(&self, owner_id: &str) -> StoreResult<Option<Prompt>> {
        Ok(self
            .prompts
            .read()
            .await
            .iter()
            .filter(|p| p.owner_id == owner_id)
            .max_by_key(|p| p.version)
            .cloned())
    }

    async fn list_prompts(&self, owner_id: &str) -> StoreResult<Vec<Prompt>> {
        let mut prompts: Vec<Prompt> = self
            .prompts
            .read()
            .await
            .iter()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect();
        prompts.sort_by(|a, b| b.version.cmp(&a.version));
        Ok(prompts)
    }

    async fn get_prompt_by_version(
        &self,
        owner_id: &str,
        version: i64,
    ) -> StoreResult<Option<Prompt>> {
        Ok(self
            .prompts
            .read()
            .await
            .iter()
            .find(|p| p.owner_id == owner_id && p.version == version)
            .cloned())
    }

    async fn append_prompt(&self, owner_id: &str, text: &str) -> StoreResult<Prompt> {
        let mut prompts = self.prompts.write().await;
        let version = Prompt::next_version(latest_version(&prompts, owner_id));
        let prompt = Prompt::new(owner_id, text, version);
        prompts.push(prompt.clone());
        Ok(prompt)
    }

    async fn insert_initial_prompt(
        &self,
        owner_id: &str,
        text: &str,
    ) -> StoreResult<Option<Prompt>> {
        let mut prompts = self.prompts.write().await;
        if latest_version(&prompts, owner_id).is_some() {
            return Ok(None);
        }
        let prompt = Prompt::new(owner_id, text, 1);
        prompts.push(prompt.clone());
        Ok(Some(prompt))
    }

    async fn insert_thought(&self, thought: &Thought) -> StoreResult<()> {
        self.thoughts
            .write()
            .await
            .insert(thought.id, thought.clone());
        Ok(())
    }

    async fn get_thought(&self, id: Uuid) -> StoreResult<Option<Thought>> {
        Ok(self.thoughts.read().await.get(&id).cloned())
    }

    async fn list_thoughts(&self, owner_id: &str) -> StoreResult<Vec<Thought>> {
        let mut thoughts: Vec<Thought> = self
            .thoughts
            .read()
            .await
            .values()
            .filter(|t| t.owner_id == owner_id)
            .cloned()
            .collect();
        thoughts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(thoughts)
    }

    async fn set_thought_status(&self, id: Uuid, status: &ThoughtStatus) -> StoreResult<Thought> {
        let mut thoughts = self.thoughts.write().await;
        let thought = thoughts.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        thought.status = status.clone();
        thought.updated_at = Utc::now();
        Ok(thought.clone())
    }
}
