use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::AppState;
use crate::domain::Entity;
use crate::error::ApiResult;
use crate::security::UserContext;

#[derive(Debug, Deserialize)]
pub struct AddEntityRequest {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub description: String,
}

/// POST /api/entities
pub async fn add_entity(
    State(state): State<AppState>,
    user: UserContext,
    Json(req): Json<AddEntityRequest>,
) -> ApiResult<(StatusCode, Json<Entity>)> {
    let entity = state
        .notes
        .add_entity(&user.user_id, &req.name, &req.kind, &req.description)
        .await?;
    Ok((StatusCode::CREATED, Json(entity)))
}

/// GET /api/entities
pub async fn list_entities(
    State(state): State<AppState>,
    user: UserContext,
) -> ApiResult<Json<Vec<Entity>>> {
    Ok(Json(state.notes.list_entities(&user.user_id).await?))
}

/// DELETE /api/entities/{id}
pub async fn delete_entity(
    State(state): State<AppState>,
    user: UserContext,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.notes.delete_entity(&user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
