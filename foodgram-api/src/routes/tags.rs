/// Tag read endpoints
///
/// Tags are admin-curated; the public API only lists and retrieves them,
/// without pagination (the vocabulary is small by construction).
///
/// # Endpoints
///
/// - `GET /api/tags` - List all tags
/// - `GET /api/tags/:id` - Retrieve one tag

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Json,
};
use foodgram_shared::models::tag::Tag;

/// List all tags
pub async fn list_tags(State(state): State<AppState>) -> ApiResult<Json<Vec<Tag>>> {
    let tags = Tag::list(&state.db).await?;

    Ok(Json(tags))
}

/// Retrieve one tag
///
/// # Errors
///
/// - `404 Not Found`: unknown tag id
pub async fn get_tag(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Tag>> {
    let tag = Tag::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Tag not found".to_string()))?;

    Ok(Json(tag))
}
