use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::AppState;
use crate::domain::ThoughtView;
use crate::error::ApiResult;
use crate::security::UserContext;

#[derive(Debug, Deserialize)]
pub struct AddThoughtRequest {
    pub original_content: String,
}

/// POST /api/thoughts - Store a thought; enrichment runs in the background.
pub async fn add_thought(
    State(state): State<AppState>,
    user: UserContext,
    Json(req): Json<AddThoughtRequest>,
) -> ApiResult<(StatusCode, Json<ThoughtView>)> {
    let thought = state
        .notes
        .add_thought(&user.user_id, &req.original_content)
        .await?;
    Ok((StatusCode::CREATED, Json(thought.view())))
}

/// GET /api/thoughts - Newest first.
pub async fn list_thoughts(
    State(state): State<AppState>,
    user: UserContext,
) -> ApiResult<Json<Vec<ThoughtView>>> {
    let thoughts = state.notes.list_thoughts(&user.user_id).await?;
    Ok(Json(thoughts.iter().map(ThoughtView::from).collect()))
}

/// GET /api/thoughts/{id}
pub async fn get_thought(
    State(state): State<AppState>,
    user: UserContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ThoughtView>> {
    let thought = state.notes.get_thought(&user.user_id, id).await?;
    Ok(Json(thought.view()))
}
