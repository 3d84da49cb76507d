use crate::domain::{Entity, Prompt, Thought, ThoughtStatus};
use crate::persistence::{NoteStore, StoreError, StoreResult};
use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use uuid::Uuid;

/// Attempts made when a concurrent save claims the same prompt version.
const APPEND_ATTEMPTS: usize = 3;

#[derive(Debug)]
pub struct PostgresProvider {
    pool: PgPool,
}

impl PostgresProvider {
    pub async fn new(connection_string: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(connection_string)
            .await?;

        // Run Migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }
}

fn entity_from_row(row: &PgRow) -> StoreResult<Entity> {
    Ok(Entity {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        name: row.try_get("name")?,
        kind: row.try_get("kind")?,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
    })
}

fn prompt_from_row(row: &PgRow) -> StoreResult<Prompt> {
    Ok(Prompt {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        text: row.try_get("prompt_text")?,
        version: row.try_get("version")?,
        created_at: row.try_get("created_at")?,
    })
}

fn thought_from_row(row: &PgRow) -> StoreResult<Thought> {
    let label: String = row.try_get("status")?;
    let enriched: Option<String> = row.try_get("enriched_content")?;
    let reason: Option<String> = row.try_get("failure_reason")?;

    let status = match label.as_str() {
        "enriched" => ThoughtStatus::Enriched {
            text: enriched.unwrap_or_default(),
        },
        "failed" => ThoughtStatus::Failed {
            reason: reason.unwrap_or_default(),
        },
        _ => ThoughtStatus::Pending,
    };

    Ok(Thought {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        original_content: row.try_get("original_content")?,
        status,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl NoteStore for PostgresProvider {
    async fn insert_entity(&self, entity: &Entity) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO entities (id, owner_id, name, kind, description, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(entity.id)
        .bind(&entity.owner_id)
        .bind(&entity.name)
        .bind(&entity.kind)
        .bind(&entity.description)
        .bind(entity.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_entity(&self, id: Uuid) -> StoreResult<Option<Entity>> {
        let row = sqlx::query("SELECT * FROM entities WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(entity_from_row).transpose()
    }

    async fn list_entities(&self, owner_id: &str) -> StoreResult<Vec<Entity>> {
        let rows = sqlx::query(
            "SELECT * FROM entities WHERE owner_id = $1 ORDER BY name ASC, created_at ASC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(entity_from_row).collect()
    }

    async fn delete_entity(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM entities WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn latest_prompt(&self, owner_id: &str) -> StoreResult<Option<Prompt>> {
        let row = sqlx::query(
            "SELECT * FROM prompts WHERE owner_id = $1 ORDER BY version DESC LIMIT 1",
        )
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(prompt_from_row).transpose()
    }

    async fn list_prompts(&self, owner_id: &str) -> StoreResult<Vec<Prompt>> {
        let rows = sqlx::query("SELECT * FROM prompts WHERE owner_id = $1 ORDER BY version DESC")
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(prompt_from_row).collect()
    }

    async fn get_prompt_by_version(
        &self,
        owner_id: &str,
        version: i64,
    ) -> StoreResult<Option<Prompt>> {
        let row = sqlx::query("SELECT * FROM prompts WHERE owner_id = $1 AND version = $2")
            .bind(owner_id)
            .bind(version)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(prompt_from_row).transpose()
    }

    async fn append_prompt(&self, owner_id: &str, text: &str) -> StoreResult<Prompt> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            // Version is derived inside the INSERT; the (owner_id, version) unique
            // index rejects a concurrent writer that read the same maximum.
            let result = sqlx::query(
                r#"
                INSERT INTO prompts (id, owner_id, prompt_text, version, created_at)
                SELECT $1, $2, $3, COALESCE(MAX(version), 0) + 1, NOW()
                FROM prompts WHERE owner_id = $2
                RETURNING *
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(owner_id)
            .bind(text)
            .fetch_one(&self.pool)
            .await;

            match result {
                Ok(row) => return prompt_from_row(&row),
                Err(e) if is_unique_violation(&e) && attempt < APPEND_ATTEMPTS => {
                    tracing::debug!(owner_id, attempt, "Prompt version taken, retrying append");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn insert_initial_prompt(
        &self,
        owner_id: &str,
        text: &str,
    ) -> StoreResult<Option<Prompt>> {
        let row = sqlx::query(
            r#"
            INSERT INTO prompts (id, owner_id, prompt_text, version, created_at)
            SELECT $1, $2, $3, 1, NOW()
            WHERE NOT EXISTS (SELECT 1 FROM prompts WHERE owner_id = $2)
            ON CONFLICT (owner_id, version) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(text)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(prompt_from_row).transpose()
    }

    async fn insert_thought(&self, thought: &Thought) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO thoughts (id, owner_id, original_content, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(thought.id)
        .bind(&thought.owner_id)
        .bind(&thought.original_content)
        .bind(thought.status.label())
        .bind(thought.created_at)
        .bind(thought.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_thought(&self, id: Uuid) -> StoreResult<Option<Thought>> {
        let row = sqlx::query("SELECT * FROM thoughts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(thought_from_row).transpose()
    }

    async fn list_thoughts(&self, owner_id: &str) -> StoreResult<Vec<Thought>> {
        let rows =
            sqlx::query("SELECT * FROM thoughts WHERE owner_id = $1 ORDER BY created_at DESC")
                .bind(owner_id)
                .fetch_all(&self.pool)
                .await?;
        rows.iter().map(thought_from_row).collect()
    }

    async fn set_thought_status(&self, id: Uuid, status: &ThoughtStatus) -> StoreResult<Thought> {
        let (enriched, reason) = match status {
            ThoughtStatus::Pending => (None, None),
            ThoughtStatus::Enriched { text } => (Some(text.as_str()), None),
            ThoughtStatus::Failed { reason } => (None, Some(reason.as_str())),
        };

        let row = sqlx::query(
            r#"
            UPDATE thoughts
            SET status = $2, enriched_content = $3, failure_reason = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status.label())
        .bind(enriched)
        .bind(reason)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => thought_from_row(&row),
            None => Err(StoreError::NotFound(id)),
        }
    }
}
