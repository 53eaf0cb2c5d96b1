/// Ingredient read endpoints
///
/// The ingredient reference list is searched by name prefix while a user
/// types into the recipe editor, so the list endpoint is unpaginated and
/// filterable.
///
/// # Endpoints
///
/// - `GET /api/ingredients?name=<prefix>` - List ingredients
/// - `GET /api/ingredients/:id` - Retrieve one ingredient

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use foodgram_shared::models::ingredient::Ingredient;
use serde::Deserialize;

/// Ingredient list query parameters
#[derive(Debug, Default, Deserialize)]
pub struct IngredientListQuery {
    /// Case-insensitive name prefix filter
    pub name: Option<String>,
}

/// List ingredients, optionally filtered by name prefix
pub async fn list_ingredients(
    State(state): State<AppState>,
    Query(query): Query<IngredientListQuery>,
) -> ApiResult<Json<Vec<Ingredient>>> {
    let ingredients = Ingredient::list(&state.db, query.name.as_deref()).await?;

    Ok(Json(ingredients))
}

/// Retrieve one ingredient
///
/// # Errors
///
/// - `404 Not Found`: unknown ingredient id
pub async fn get_ingredient(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Ingredient>> {
    let ingredient = Ingredient::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Ingredient not found".to_string()))?;

    Ok(Json(ingredient))
}
