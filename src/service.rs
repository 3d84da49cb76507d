//! Owner-scoped operations behind the HTTP API.
//!
//! Every method takes the authenticated owner id. Mutations are applied to the
//! store synchronously; enrichment follows on the [`TaskScheduler`].

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Entity, Prompt, Thought};
use crate::enrichment::prompt::DEFAULT_SYSTEM_PROMPT;
use crate::enrichment::{ChangeFeed, EnrichmentJob, TaskRecord, TaskScheduler, ThoughtEventKind};
use crate::error::{ApiError, ApiResult};
use crate::persistence::NoteStore;

#[derive(Debug, Clone)]
pub struct NotesService {
    store: Arc<dyn NoteStore>,
    scheduler: TaskScheduler,
    feed: ChangeFeed,
}

fn require_text(value: &str, field: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(ApiError::BadRequest(format!("{field} must not be empty")));
    }
    Ok(())
}

impl NotesService {
    pub fn new(store: Arc<dyn NoteStore>, scheduler: TaskScheduler, feed: ChangeFeed) -> Self {
        Self {
            store,
            scheduler,
            feed,
        }
    }

    pub fn feed(&self) -> &ChangeFeed {
        &self.feed
    }

    pub fn scheduler(&self) -> &TaskScheduler {
        &self.scheduler
    }

    // =========================================================================
    // Entities
    // =========================================================================

    pub async fn add_entity(
        &self,
        owner_id: &str,
        name: &str,
        kind: &str,
        description: &str,
    ) -> ApiResult<Entity> {
        require_text(name, "name")?;
        let entity = Entity::new(owner_id, name, kind, description);
        self.store.insert_entity(&entity).await?;
        tracing::info!(owner_id, entity_id = %entity.id, "Entity added");
        Ok(entity)
    }

    pub async fn list_entities(&self, owner_id: &str) -> ApiResult<Vec<Entity>> {
        Ok(self.store.list_entities(owner_id).await?)
    }

    /// Delete an entity owned by `owner_id`; anything else is an authorization error.
    pub async fn delete_entity(&self, owner_id: &str, entity_id: Uuid) -> ApiResult<()> {
        match self.store.get_entity(entity_id).await? {
            Some(entity) if entity.is_owned_by(owner_id) => {
                self.store.delete_entity(entity_id).await?;
                tracing::info!(owner_id, entity_id = %entity_id, "Entity deleted");
                Ok(())
            }
            _ => {
                tracing::warn!(owner_id, entity_id = %entity_id, "Rejected entity delete");
                Err(ApiError::Forbidden(
                    "Entity not found or user not authorized".to_string(),
                ))
            }
        }
    }

    // =========================================================================
    // Thoughts
    // =========================================================================

    /// Store a new pending thought and schedule its enrichment.
    pub async fn add_thought(&self, owner_id: &str, original_content: &str) -> ApiResult<Thought> {
        require_text(original_content, "original_content")?;
        let thought = Thought::new(owner_id, original_content);
        self.store.insert_thought(&thought).await?;
        self.feed.publish(ThoughtEventKind::Created, &thought);

        let task = self
            .scheduler
            .schedule(
                owner_id,
                EnrichmentJob::EnrichThought {
                    thought_id: thought.id,
                    original_content: thought.original_content.clone(),
                },
            )
            .await;
        tracing::info!(owner_id, thought_id = %thought.id, task_id = %task.id, "Thought added");
        Ok(thought)
    }

    pub async fn list_thoughts(&self, owner_id: &str) -> ApiResult<Vec<Thought>> {
        Ok(self.store.list_thoughts(owner_id).await?)
    }

    pub async fn get_thought(&self, owner_id: &str, thought_id: Uuid) -> ApiResult<Thought> {
        self.store
            .get_thought(thought_id)
            .await?
            .filter(|t| t.owner_id == owner_id)
            .ok_or_else(|| ApiError::NotFound(format!("Thought '{thought_id}' not found")))
    }

    // =========================================================================
    // Prompts
    // =========================================================================

    /// Append a new prompt version and schedule one rerun of all thoughts.
    pub async fn save_prompt(&self, owner_id: &str, text: &str) -> ApiResult<(Prompt, TaskRecord)> {
        require_text(text, "prompt_text")?;
        let prompt = self.store.append_prompt(owner_id, text).await?;
        let task = self.scheduler.schedule(owner_id, EnrichmentJob::RerunAll).await;
        tracing::info!(
            owner_id,
            version = prompt.version,
            task_id = %task.id,
            "Prompt saved, rerun scheduled"
        );
        Ok((prompt, task))
    }

    pub async fn list_prompts(&self, owner_id: &str) -> ApiResult<Vec<Prompt>> {
        Ok(self.store.list_prompts(owner_id).await?)
    }

    pub async fn get_prompt_by_version(&self, owner_id: &str, version: i64) -> ApiResult<Prompt> {
        self.store
            .get_prompt_by_version(owner_id, version)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Prompt version {version} not found")))
    }

    /// Seed the built-in prompt as version 1 if the owner has none; return the latest.
    pub async fn ensure_initial_prompt(&self, owner_id: &str) -> ApiResult<Prompt> {
        if let Some(seeded) = self
            .store
            .insert_initial_prompt(owner_id, DEFAULT_SYSTEM_PROMPT)
            .await?
        {
            tracing::info!(owner_id, "Seeded default prompt");
            return Ok(seeded);
        }
        self.store
            .latest_prompt(owner_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("No prompt found".to_string()))
    }

    // =========================================================================
    // Tasks
    // =========================================================================

    pub async fn get_task(&self, owner_id: &str, task_id: Uuid) -> ApiResult<TaskRecord> {
        self.scheduler
            .get(task_id)
            .await
            .filter(|t| t.owner_id == owner_id)
            .ok_or_else(|| ApiError::NotFound(format!("Task '{task_id}' not found")))
    }
}
