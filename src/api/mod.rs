//! JSON HTTP API. Every route here requires an authenticated caller.

pub mod entities;
pub mod events;
pub mod prompts;
pub mod tasks;
pub mod thoughts;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::AppState;

pub fn build_router() -> Router<AppState> {
    Router::new()
        // Entities (memory)
        .route(
            "/entities",
            get(entities::list_entities).post(entities::add_entity),
        )
        .route("/entities/{id}", delete(entities::delete_entity))
        // Thoughts
        .route(
            "/thoughts",
            get(thoughts::list_thoughts).post(thoughts::add_thought),
        )
        .route("/thoughts/events", get(events::stream_thought_events))
        .route("/thoughts/{id}", get(thoughts::get_thought))
        // Prompts
        .route("/prompts", get(prompts::list_prompts).post(prompts::save_prompt))
        .route(
            "/prompts/ensure-default",
            post(prompts::ensure_initial_prompt),
        )
        .route("/prompts/{version}", get(prompts::get_prompt_by_version))
        // Tasks
        .route("/tasks/{id}", get(tasks::get_task))
}
