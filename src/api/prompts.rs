use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;
use crate::domain::Prompt;
use crate::error::ApiResult;
use crate::security::UserContext;

#[derive(Debug, Deserialize)]
pub struct SavePromptRequest {
    pub prompt_text: String,
}

#[derive(Debug, Serialize)]
pub struct SavePromptResponse {
    #[serde(flatten)]
    pub prompt: Prompt,
    /// Task re-enriching every existing thought with the new version.
    pub rerun_task_id: Uuid,
}

/// POST /api/prompts - Save a new version and rerun enrichment for all thoughts.
pub async fn save_prompt(
    State(state): State<AppState>,
    user: UserContext,
    Json(req): Json<SavePromptRequest>,
) -> ApiResult<(StatusCode, Json<SavePromptResponse>)> {
    let (prompt, task) = state
        .notes
        .save_prompt(&user.user_id, &req.prompt_text)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(SavePromptResponse {
            prompt,
            rerun_task_id: task.id,
        }),
    ))
}

/// GET /api/prompts - All versions, newest first.
pub async fn list_prompts(
    State(state): State<AppState>,
    user: UserContext,
) -> ApiResult<Json<Vec<Prompt>>> {
    Ok(Json(state.notes.list_prompts(&user.user_id).await?))
}

/// GET /api/prompts/{version}
pub async fn get_prompt_by_version(
    State(state): State<AppState>,
    user: UserContext,
    Path(version): Path<i64>,
) -> ApiResult<Json<Prompt>> {
    Ok(Json(
        state
            .notes
            .get_prompt_by_version(&user.user_id, version)
            .await?,
    ))
}

/// POST /api/prompts/ensure-default
pub async fn ensure_initial_prompt(
    State(state): State<AppState>,
    user: UserContext,
) -> ApiResult<Json<Prompt>> {
    Ok(Json(state.notes.ensure_initial_prompt(&user.user_id).await?))
}
