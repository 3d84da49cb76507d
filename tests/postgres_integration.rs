//! Integration tests for the Postgres store.
//!
//! Requires: DATABASE_URL environment variable pointing to a Postgres instance.
//! Every test uses a fresh owner id, so runs do not interfere with each other.

use serial_test::serial;
use std::sync::Arc;
use uuid::Uuid;

use thoughtful::domain::{Entity, Thought, ThoughtStatus};
use thoughtful::persistence::{NoteStore, providers::postgres::PostgresProvider};

// =============================================================================
// Test Utilities
// =============================================================================

/// Get the database URL from environment, or skip test if not set.
fn get_database_url() -> Option<String> {
    std::env::var("DATABASE_URL").ok()
}

async fn setup_store() -> Option<Arc<dyn NoteStore>> {
    let url = get_database_url()?;
    let provider = PostgresProvider::new(&url, 5).await.ok()?;
    Some(Arc::new(provider))
}

fn test_owner(suffix: &str) -> String {
    format!("test-{suffix}-{}", &Uuid::new_v4().to_string()[..8])
}

// =============================================================================
// Entities
// =============================================================================

#[tokio::test]
#[serial]
async fn test_entity_round_trip() {
    let Some(store) = setup_store().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    let owner = test_owner("entity");

    let zed = Entity::new(&owner, "Zed", "person", "Neighbor");
    let amy = Entity::new(&owner, "Amy", "person", "");
    store.insert_entity(&zed).await.unwrap();
    store.insert_entity(&amy).await.unwrap();

    let listed = store.list_entities(&owner).await.unwrap();
    let names: Vec<&str> = listed.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Amy", "Zed"]);

    let fetched = store.get_entity(zed.id).await.unwrap().unwrap();
    assert_eq!(fetched.description, "Neighbor");

    store.delete_entity(zed.id).await.unwrap();
    assert!(store.get_entity(zed.id).await.unwrap().is_none());
    assert_eq!(store.list_entities(&owner).await.unwrap().len(), 1);
}

// =============================================================================
// Prompts
// =============================================================================

#[tokio::test]
#[serial]
async fn test_prompt_versions_are_sequential() {
    let Some(store) = setup_store().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    let owner = test_owner("prompt");

    assert!(store.latest_prompt(&owner).await.unwrap().is_none());

    let mut handles = Vec::new();
    for i in 0..8 {
        let store = store.clone();
        let owner = owner.clone();
        handles.push(tokio::spawn(async move {
            store.append_prompt(&owner, &format!("v{i}")).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let versions: Vec<i64> = store
        .list_prompts(&owner)
        .await
        .unwrap()
        .iter()
        .map(|p| p.version)
        .collect();
    assert_eq!(versions, (1..=8).rev().collect::<Vec<_>>());
    assert_eq!(store.latest_prompt(&owner).await.unwrap().unwrap().version, 8);
    assert!(store.get_prompt_by_version(&owner, 3).await.unwrap().is_some());
    assert!(store.get_prompt_by_version(&owner, 9).await.unwrap().is_none());
}

#[tokio::test]
#[serial]
async fn test_initial_prompt_only_once() {
    let Some(store) = setup_store().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    let owner = test_owner("initial");

    let seeded = store.insert_initial_prompt(&owner, "default").await.unwrap();
    assert_eq!(seeded.map(|p| p.version), Some(1));
    assert!(
        store
            .insert_initial_prompt(&owner, "default")
            .await
            .unwrap()
            .is_none()
    );
    assert_eq!(store.list_prompts(&owner).await.unwrap().len(), 1);
}

// =============================================================================
// Thoughts
// =============================================================================

#[tokio::test]
#[serial]
async fn test_thought_status_is_persisted() {
    let Some(store) = setup_store().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    let owner = test_owner("thought");

    let thought = Thought::new(&owner, "call mom");
    store.insert_thought(&thought).await.unwrap();
    let fetched = store.get_thought(thought.id).await.unwrap().unwrap();
    assert_eq!(fetched.status, ThoughtStatus::Pending);

    let enriched = ThoughtStatus::Enriched {
        text: "Call mom about Sunday.".to_string(),
    };
    let updated = store.set_thought_status(thought.id, &enriched).await.unwrap();
    assert_eq!(updated.status, enriched);
    assert!(updated.updated_at >= updated.created_at);

    let failed = ThoughtStatus::Failed {
        reason: "timeout".to_string(),
    };
    store.set_thought_status(thought.id, &failed).await.unwrap();
    let fetched = store.get_thought(thought.id).await.unwrap().unwrap();
    assert_eq!(fetched.status, failed);
    assert_eq!(fetched.view().enriched_content.as_deref(), Some("Error during enrichment."));

    let missing = store
        .set_thought_status(Uuid::new_v4(), &ThoughtStatus::Pending)
        .await;
    assert!(missing.is_err());
}
