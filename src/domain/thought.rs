use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Text stored in place of an enrichment when the worker fails.
pub const ENRICHMENT_ERROR_TEXT: &str = "Error during enrichment.";

/// Enrichment state of a thought.
///
/// A thought is `Pending` from creation (or from a rerun being scheduled) until
/// the worker patches it to `Enriched` or `Failed`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ThoughtStatus {
    #[default]
    Pending,
    Enriched { text: String },
    Failed { reason: String },
}

impl ThoughtStatus {
    pub fn is_processing(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Text shown as the enriched content, if the thought has settled.
    pub fn enriched_content(&self) -> Option<&str> {
        match self {
            Self::Pending => None,
            Self::Enriched { text } => Some(text),
            Self::Failed { .. } => Some(ENRICHMENT_ERROR_TEXT),
        }
    }

    /// Short label used for storage columns and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Enriched { .. } => "enriched",
            Self::Failed { .. } => "failed",
        }
    }
}

/// A user-submitted note and its enrichment state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thought {
    pub id: Uuid,
    pub owner_id: String,
    pub original_content: String,
    pub status: ThoughtStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Thought {
    pub fn new(owner_id: impl Into<String>, original_content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id: owner_id.into(),
            original_content: original_content.into(),
            status: ThoughtStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn view(&self) -> ThoughtView {
        ThoughtView::from(self)
    }
}

/// Client-facing shape of a thought.
///
/// Keeps the flat `processing` / `enriched_content` fields next to the tagged
/// status so simple clients never need to inspect the state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThoughtView {
    pub id: Uuid,
    pub original_content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enriched_content: Option<String>,
    pub processing: bool,
    pub status: ThoughtStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Thought> for ThoughtView {
    fn from(thought: &Thought) -> Self {
        Self {
            id: thought.id,
            original_content: thought.original_content.clone(),
            enriched_content: thought.status.enriched_content().map(ToString::to_string),
            processing: thought.status.is_processing(),
            status: thought.status.clone(),
            created_at: thought.created_at,
            updated_at: thought.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_thought_is_processing() {
        let thought = Thought::new("user-1", "Walked Max in the park");
        let view = thought.view();

        assert!(view.processing);
        assert_eq!(view.enriched_content, None);
        assert_eq!(view.status, ThoughtStatus::Pending);
    }

    #[test]
    fn test_failed_status_shows_placeholder() {
        let status = ThoughtStatus::Failed {
            reason: "connection refused".to_string(),
        };

        assert!(!status.is_processing());
        assert_eq!(status.enriched_content(), Some(ENRICHMENT_ERROR_TEXT));
        assert_eq!(status.label(), "failed");
    }

    #[test]
    fn test_status_wire_format() {
        let status = ThoughtStatus::Enriched {
            text: "Max, the Golden Retriever".to_string(),
        };
        let json = serde_json::to_value(&status).unwrap();

        assert_eq!(json["state"], "enriched");
        assert_eq!(json["text"], "Max, the Golden Retriever");
    }
}
