use crate::domain::{Thought, ThoughtView};
use serde::Serialize;
use tokio::sync::broadcast;

/// Buffered events per subscriber before it starts lagging.
const FEED_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThoughtEventKind {
    Created,
    Updated,
}

/// A change to one thought, published to every subscriber of its owner.
#[derive(Debug, Clone, Serialize)]
pub struct ThoughtEvent {
    #[serde(skip)]
    pub owner_id: String,
    pub kind: ThoughtEventKind,
    pub thought: ThoughtView,
}

/// Fan-out of thought changes; subscribers filter by owner.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<ThoughtEvent>,
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeFeed {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(FEED_CAPACITY);
        Self { tx }
    }

    pub fn publish(&self, kind: ThoughtEventKind, thought: &Thought) {
        let event = ThoughtEvent {
            owner_id: thought.owner_id.clone(),
            kind,
            thought: thought.view(),
        };
        // No subscribers is fine.
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ThoughtEvent> {
        self.tx.subscribe()
    }
}
