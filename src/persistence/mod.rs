use crate::domain::{Entity, Prompt, Thought, ThoughtStatus};
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub mod providers;

/// Errors raised by a [`NoteStore`] provider.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Owner-scoped storage for entities, prompts and thoughts.
///
/// Providers only filter by owner; authorization decisions live in the service layer.
#[async_trait]
pub trait NoteStore: Send + Sync + std::fmt::Debug {
    // =========================================================================
    // Entities
    // =========================================================================

    async fn insert_entity(&self, entity: &Entity) -> StoreResult<()>;

    async fn get_entity(&self, id: Uuid) -> StoreResult<Option<Entity>>;

    /// All entities of `owner_id`, ordered by name.
    async fn list_entities(&self, owner_id: &str) -> StoreResult<Vec<Entity>>;

    async fn delete_entity(&self, id: Uuid) -> StoreResult<()>;

    // =========================================================================
    // Prompts
    // =========================================================================

    /// Highest version stored for `owner_id`.
    async fn latest_prompt(&self, owner_id: &str) -> StoreResult<Option<Prompt>>;

    /// All versions of `owner_id`, newest first.
    async fn list_prompts(&self, owner_id: &str) -> StoreResult<Vec<Prompt>>;

    async fn get_prompt_by_version(
        &self,
        owner_id: &str,
        version: i64,
    ) -> StoreResult<Option<Prompt>>;

    /// Store `text` as the next version for `owner_id` (1 when none exist).
    ///
    /// Computing the version and inserting it must be atomic with respect to
    /// other appends for the same owner.
    async fn append_prompt(&self, owner_id: &str, text: &str) -> StoreResult<Prompt>;

    /// Store `text` as version 1 only if `owner_id` has no prompts yet.
    async fn insert_initial_prompt(&self, owner_id: &str, text: &str)
    -> StoreResult<Option<Prompt>>;

    // =========================================================================
    // Thoughts
    // =========================================================================

    async fn insert_thought(&self, thought: &Thought) -> StoreResult<()>;

    async fn get_thought(&self, id: Uuid) -> StoreResult<Option<Thought>>;

    /// All thoughts of `owner_id`, newest first.
    async fn list_thoughts(&self, owner_id: &str) -> StoreResult<Vec<Thought>>;

    /// Patch the enrichment state and return the updated record.
    async fn set_thought_status(&self, id: Uuid, status: &ThoughtStatus) -> StoreResult<Thought>;
}
