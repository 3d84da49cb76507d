use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::AppState;
use crate::enrichment::TaskRecord;
use crate::error::ApiResult;
use crate::security::UserContext;

/// GET /api/tasks/{id} - Status of a scheduled enrichment task.
pub async fn get_task(
    State(state): State<AppState>,
    user: UserContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TaskRecord>> {
    Ok(Json(state.notes.get_task(&user.user_id, id).await?))
}
