//! Enrichment worker and the rerun-all job.

use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::domain::ThoughtStatus;
use crate::enrichment::events::{ChangeFeed, ThoughtEventKind};
use crate::enrichment::prompt::{DEFAULT_SYSTEM_PROMPT, compose_messages, extract_enrichment};
use crate::llm::{CompletionRequest, TextGenerator};
use crate::persistence::{NoteStore, StoreResult};

/// Enriches thoughts with one LLM call each and patches the result back.
#[derive(Debug, Clone)]
pub struct EnrichmentWorker {
    store: Arc<dyn NoteStore>,
    generator: Arc<dyn TextGenerator>,
    feed: ChangeFeed,
    max_tokens: u32,
}

impl EnrichmentWorker {
    pub fn new(
        store: Arc<dyn NoteStore>,
        generator: Arc<dyn TextGenerator>,
        feed: ChangeFeed,
        max_tokens: u32,
    ) -> Self {
        Self {
            store,
            generator,
            feed,
            max_tokens,
        }
    }

    /// Enrich one thought and record the outcome.
    ///
    /// Errors while gathering context or calling the model become
    /// [`ThoughtStatus::Failed`]. The thought is patched exactly once; only a
    /// failed patch is returned as an error. `owner_id` is trusted from the caller.
    #[instrument(skip_all, fields(thought_id = %thought_id, owner_id = %owner_id))]
    pub async fn enrich_thought(
        &self,
        thought_id: Uuid,
        owner_id: &str,
        original_content: &str,
    ) -> StoreResult<ThoughtStatus> {
        let status = match self.generate(owner_id, original_content).await {
            Ok(text) => ThoughtStatus::Enriched { text },
            Err(e) => {
                tracing::error!(error = %e, "Error enriching thought");
                ThoughtStatus::Failed {
                    reason: e.to_string(),
                }
            }
        };

        let thought = self
            .store
            .set_thought_status(thought_id, &status)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to record thought enrichment"))?;
        tracing::info!(status = status.label(), "Thought enrichment recorded");
        self.feed.publish(ThoughtEventKind::Updated, &thought);

        Ok(status)
    }

    async fn generate(&self, owner_id: &str, original_content: &str) -> anyhow::Result<String> {
        let entities = self.store.list_entities(owner_id).await?;
        let names: Vec<&str> = entities.iter().map(|e| e.name.as_str()).collect();

        let prompt = self.store.latest_prompt(owner_id).await?;
        let system_prompt = prompt
            .as_ref()
            .map_or(DEFAULT_SYSTEM_PROMPT, |p| p.text.as_str());
        tracing::debug!(
            entity_count = names.len(),
            prompt_version = prompt.as_ref().map(|p| p.version),
            "Composing enrichment request"
        );

        let messages = compose_messages(system_prompt, original_content, &names);
        let content = self
            .generator
            .complete(CompletionRequest {
                messages,
                max_tokens: self.max_tokens,
            })
            .await?;

        Ok(extract_enrichment(content))
    }

    /// Re-enrich every thought of `owner_id`, one after another.
    ///
    /// Each thought is put back to pending before its new pass, and each pass
    /// uses the stored original text. Returns the number of thoughts processed.
    #[instrument(skip_all, fields(owner_id = %owner_id))]
    pub async fn rerun_all(&self, owner_id: &str) -> StoreResult<usize> {
        let thoughts = self.store.list_thoughts(owner_id).await?;
        tracing::info!(thought_count = thoughts.len(), "Rerunning enrichment for all thoughts");

        for thought in &thoughts {
            match self
                .store
                .set_thought_status(thought.id, &ThoughtStatus::Pending)
                .await
            {
                Ok(pending) => self.feed.publish(ThoughtEventKind::Updated, &pending),
                Err(e) => {
                    tracing::warn!(thought_id = %thought.id, error = %e, "Failed to reset thought to pending");
                }
            }
            // Already logged; the remaining thoughts still get their pass.
            let _ = self
                .enrich_thought(thought.id, owner_id, &thought.original_content)
                .await;
        }

        Ok(thoughts.len())
    }
}
