use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named memory item (person, place, pet, ...) used as enrichment context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: Uuid,
    pub owner_id: String,
    pub name: String,
    /// Free-form category, e.g. "person" or "place".
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Entity {
    pub fn new(
        owner_id: impl Into<String>,
        name: impl Into<String>,
        kind: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id: owner_id.into(),
            name: name.into(),
            kind: kind.into(),
            description: description.into(),
            created_at: Utc::now(),
        }
    }

    pub fn is_owned_by(&self, owner_id: &str) -> bool {
        self.owner_id == owner_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serializes_as_type() {
        let entity = Entity::new("user-1", "Max", "pet", "Golden Retriever, loves fetch");
        let json = serde_json::to_value(&entity).unwrap();

        assert_eq!(json["type"], "pet");
        assert!(json.get("kind").is_none());
        assert!(entity.is_owned_by("user-1"));
        assert!(!entity.is_owned_by("user-2"));
    }
}
