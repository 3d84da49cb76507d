//! Owner-scoped records: memory entities, versioned prompts and thoughts.

pub mod entity;
pub mod prompt;
pub mod thought;

pub use entity::Entity;
pub use prompt::Prompt;
pub use thought::{Thought, ThoughtStatus, ThoughtView};
