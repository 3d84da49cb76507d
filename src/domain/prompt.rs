use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One immutable version of a user's system prompt.
///
/// Versions start at 1 and increase by one per save. Older versions are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    pub id: Uuid,
    pub owner_id: String,
    #[serde(rename = "prompt_text")]
    pub text: String,
    pub version: i64,
    pub created_at: DateTime<Utc>,
}

impl Prompt {
    pub fn new(owner_id: impl Into<String>, text: impl Into<String>, version: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id: owner_id.into(),
            text: text.into(),
            version,
            created_at: Utc::now(),
        }
    }

    /// Version that follows `latest`, or 1 for a user with no prompts.
    pub fn next_version(latest: Option<i64>) -> i64 {
        latest.unwrap_or(0) + 1
    }
}
