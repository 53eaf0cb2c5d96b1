/// Recipe endpoints: CRUD, favorites, shopping cart, short links
///
/// # Endpoints
///
/// - `GET /api/recipes` - List recipes (paginated, filterable, public)
/// - `GET /api/recipes/:id` - Retrieve a recipe (public)
/// - `POST /api/recipes` - Publish a recipe
/// - `PATCH /api/recipes/:id` - Edit a recipe (author only)
/// - `DELETE /api/recipes/:id` - Delete a recipe (author only)
/// - `POST/DELETE /api/recipes/:id/favorite` - Toggle favorite
/// - `POST/DELETE /api/recipes/:id/shopping_cart` - Toggle cart membership
/// - `GET /api/recipes/download_shopping_cart` - Download `cart.txt`
/// - `GET /api/recipes/:id/get-link` - Short link for a recipe
///
/// Favorites and the shopping cart share one pair of handlers
/// parameterized by `RelationKind`; the two relations differ only in the
/// table they address.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    media, shopping_list,
};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use foodgram_shared::{
    auth::middleware::OptionalAuth,
    models::{
        ingredient::Ingredient,
        recipe::{IngredientAmount, Recipe, RecipeFilter, WriteRecipe},
        relation::{self, RecipeRelation, RelationKind},
        subscription::Subscription,
        tag::Tag,
        user::User,
    },
    pagination::{Page, PageQuery, Paginated},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;
use validator::Validate;

use super::users::UserResponse;

/// Compact recipe projection returned by the toggle endpoints and
/// embedded in subscription responses
#[derive(Debug, Clone, Serialize)]
pub struct RecipeShortResponse {
    /// Recipe id
    pub id: i64,

    /// Recipe name
    pub name: String,

    /// Dish photo URL
    pub image: String,

    /// Cooking time in minutes
    pub cooking_time: i32,
}

impl RecipeShortResponse {
    /// Builds the compact projection
    pub fn from_recipe(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name.clone(),
            image: recipe.image_url.clone(),
            cooking_time: recipe.cooking_time,
        }
    }
}

/// One ingredient line of a full recipe projection
#[derive(Debug, Clone, Serialize)]
pub struct RecipeIngredientResponse {
    /// Ingredient id
    pub id: i64,

    /// Ingredient name
    pub name: String,

    /// Measurement unit
    pub measurement_unit: String,

    /// Amount in the measurement unit
    pub amount: i32,
}

/// Full recipe projection
#[derive(Debug, Serialize)]
pub struct RecipeResponse {
    /// Recipe id
    pub id: i64,

    /// Attached tags
    pub tags: Vec<Tag>,

    /// The author, with the caller's subscription flag
    pub author: UserResponse,

    /// Ingredient lines with amounts
    pub ingredients: Vec<RecipeIngredientResponse>,

    /// Whether the caller favorited this recipe
    pub is_favorited: bool,

    /// Whether this recipe is in the caller's shopping cart
    pub is_in_shopping_cart: bool,

    /// Recipe name
    pub name: String,

    /// Dish photo URL
    pub image: String,

    /// Preparation instructions
    pub text: String,

    /// Cooking time in minutes
    pub cooking_time: i32,
}

/// Recipe list query parameters
#[derive(Debug, Default, Deserialize)]
pub struct RecipeListQuery {
    /// 1-based page number
    pub page: Option<u32>,

    /// Requested page size
    pub limit: Option<u32>,

    /// Only recipes by this author
    pub author: Option<Uuid>,

    /// Comma-separated tag slugs; a recipe matches if it carries any of them
    pub tags: Option<String>,

    /// "1"/"true": only recipes the caller favorited
    pub is_favorited: Option<String>,

    /// "1"/"true": only recipes in the caller's shopping cart
    pub is_in_shopping_cart: Option<String>,
}

/// Interprets the 1/0 flag convention of the list filters
fn is_truthy(value: &Option<String>) -> bool {
    matches!(value.as_deref(), Some("1") | Some("true"))
}

/// One ingredient line of a recipe write request
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct IngredientLine {
    /// Referenced ingredient id
    pub id: i64,

    /// Amount in the ingredient's measurement unit
    pub amount: i32,
}

/// Recipe create/update request
///
/// The image is an inline `data:` URL; it is required on create and
/// optional on update (the stored photo is kept when absent).
#[derive(Debug, Deserialize, Validate)]
pub struct WriteRecipeRequest {
    /// Recipe name
    #[validate(length(min = 1, max = 256, message = "Name must be 1-256 characters"))]
    pub name: String,

    /// Preparation instructions
    #[validate(length(min = 1, message = "Text must not be empty"))]
    pub text: String,

    /// Cooking time in minutes
    #[validate(range(min = 1, message = "Cooking time must be at least 1 minute"))]
    pub cooking_time: i32,

    /// Inline dish photo
    pub image: Option<String>,

    /// Ingredient lines
    pub ingredients: Vec<IngredientLine>,

    /// Tag ids
    pub tags: Vec<i64>,
}

impl WriteRecipeRequest {
    /// Structural checks the derive cannot express: non-empty,
    /// duplicate-free component lists with positive amounts.
    fn check_components(&self) -> Result<(), ApiError> {
        if self.ingredients.is_empty() {
            return Err(ApiError::BadRequest(
                "Recipe must contain at least one ingredient".to_string(),
            ));
        }
        if self.tags.is_empty() {
            return Err(ApiError::BadRequest(
                "Recipe must carry at least one tag".to_string(),
            ));
        }

        let mut seen_ingredients = HashSet::new();
        for line in &self.ingredients {
            if line.amount < 1 {
                return Err(ApiError::BadRequest(
                    "Ingredient amount must be at least 1".to_string(),
                ));
            }
            if !seen_ingredients.insert(line.id) {
                return Err(ApiError::BadRequest(
                    "Duplicate ingredient in recipe".to_string(),
                ));
            }
        }

        let mut seen_tags = HashSet::new();
        for tag in &self.tags {
            if !seen_tags.insert(*tag) {
                return Err(ApiError::BadRequest("Duplicate tag in recipe".to_string()));
            }
        }

        Ok(())
    }

    /// Verifies every referenced ingredient and tag exists
    async fn check_references(&self, state: &AppState) -> Result<(), ApiError> {
        let ingredient_ids: Vec<i64> = self.ingredients.iter().map(|l| l.id).collect();
        let found = Ingredient::find_by_ids(&state.db, &ingredient_ids).await?;
        if found.len() != ingredient_ids.len() {
            return Err(ApiError::BadRequest("Unknown ingredient id".to_string()));
        }

        let found = Tag::find_by_ids(&state.db, &self.tags).await?;
        if found.len() != self.tags.len() {
            return Err(ApiError::BadRequest("Unknown tag id".to_string()));
        }

        Ok(())
    }

    /// Converts into the model write input, given the stored image URL
    fn into_write(self, image_url: String) -> WriteRecipe {
        WriteRecipe {
            name: self.name,
            image_url,
            text: self.text,
            cooking_time: self.cooking_time,
            ingredients: self
                .ingredients
                .iter()
                .map(|l| IngredientAmount {
                    ingredient_id: l.id,
                    amount: l.amount,
                })
                .collect(),
            tag_ids: self.tags,
        }
    }
}

/// Builds full projections for a batch of recipes with four batched
/// queries instead of per-recipe lookups
async fn assemble_responses(
    state: &AppState,
    recipes: Vec<Recipe>,
    viewer: Option<Uuid>,
) -> ApiResult<Vec<RecipeResponse>> {
    let recipe_ids: Vec<i64> = recipes.iter().map(|r| r.id).collect();
    let author_ids: Vec<Uuid> = recipes.iter().map(|r| r.author_id).collect();

    let ingredient_rows = Recipe::ingredients_for(&state.db, &recipe_ids).await?;
    let tag_rows = Recipe::tags_for(&state.db, &recipe_ids).await?;
    let authors: HashMap<Uuid, User> = User::find_by_ids(&state.db, &author_ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let (favorited, in_cart, following) = match viewer {
        Some(viewer) => (
            RecipeRelation::contained_ids(&state.db, RelationKind::Favorite, viewer, &recipe_ids)
                .await?,
            RecipeRelation::contained_ids(
                &state.db,
                RelationKind::ShoppingCart,
                viewer,
                &recipe_ids,
            )
            .await?,
            Subscription::following_among(&state.db, viewer, &author_ids).await?,
        ),
        None => Default::default(),
    };

    let mut ingredients_by_recipe: HashMap<i64, Vec<RecipeIngredientResponse>> = HashMap::new();
    for row in ingredient_rows {
        ingredients_by_recipe
            .entry(row.recipe_id)
            .or_default()
            .push(RecipeIngredientResponse {
                id: row.ingredient_id,
                name: row.name,
                measurement_unit: row.measurement_unit,
                amount: row.amount,
            });
    }

    let mut tags_by_recipe: HashMap<i64, Vec<Tag>> = HashMap::new();
    for row in tag_rows {
        tags_by_recipe.entry(row.recipe_id).or_default().push(Tag {
            id: row.id,
            name: row.name,
            slug: row.slug,
        });
    }

    let mut responses = Vec::with_capacity(recipes.len());
    for recipe in recipes {
        let author = authors
            .get(&recipe.author_id)
            .ok_or_else(|| ApiError::InternalError("Recipe author missing".to_string()))?;

        responses.push(RecipeResponse {
            id: recipe.id,
            tags: tags_by_recipe.remove(&recipe.id).unwrap_or_default(),
            author: UserResponse::from_user(author, following.contains(&recipe.author_id)),
            ingredients: ingredients_by_recipe.remove(&recipe.id).unwrap_or_default(),
            is_favorited: favorited.contains(&recipe.id),
            is_in_shopping_cart: in_cart.contains(&recipe.id),
            name: recipe.name,
            image: recipe.image_url,
            text: recipe.text,
            cooking_time: recipe.cooking_time,
        });
    }

    Ok(responses)
}

/// List recipes (paginated, filterable)
///
/// Public; the personalized filters (`is_favorited`,
/// `is_in_shopping_cart`) are ignored for anonymous callers.
pub async fn list_recipes(
    State(state): State<AppState>,
    Extension(auth): Extension<OptionalAuth>,
    Query(query): Query<RecipeListQuery>,
) -> ApiResult<Json<Paginated<RecipeResponse>>> {
    let page = Page::resolve(
        PageQuery {
            page: query.page,
            limit: query.limit,
        },
        state.config.pagination.default_page_size,
        state.config.pagination.max_page_size,
    );

    let filter = RecipeFilter {
        author: query.author,
        tag_slugs: query
            .tags
            .as_deref()
            .map(|tags| {
                tags.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default(),
        favorited_by: auth.user_id().filter(|_| is_truthy(&query.is_favorited)),
        in_cart_of: auth
            .user_id()
            .filter(|_| is_truthy(&query.is_in_shopping_cart)),
    };

    let count = Recipe::count(&state.db, &filter).await?;
    let recipes = Recipe::list(&state.db, &filter, page.limit(), page.offset()).await?;

    let results = assemble_responses(&state, recipes, auth.user_id()).await?;

    Ok(Json(Paginated::new(count, page, "/api/recipes", results)))
}

/// Retrieve a recipe
///
/// # Errors
///
/// - `404 Not Found`: unknown recipe id
pub async fn get_recipe(
    State(state): State<AppState>,
    Extension(auth): Extension<OptionalAuth>,
    Path(id): Path<i64>,
) -> ApiResult<Json<RecipeResponse>> {
    let recipe = Recipe::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Recipe not found".to_string()))?;

    let mut responses = assemble_responses(&state, vec![recipe], auth.user_id()).await?;

    Ok(Json(responses.remove(0)))
}

/// Publish a recipe
///
/// # Errors
///
/// - `400 Bad Request`: empty/duplicate components, unknown references,
///   missing or undecodable image
/// - `401 Unauthorized`: anonymous caller
/// - `422 Unprocessable Entity`: field validation failed
pub async fn create_recipe(
    State(state): State<AppState>,
    Extension(auth): Extension<OptionalAuth>,
    Json(req): Json<WriteRecipeRequest>,
) -> ApiResult<(StatusCode, Json<RecipeResponse>)> {
    let auth = auth.require()?;

    req.validate()?;
    req.check_components()?;
    req.check_references(&state).await?;

    let payload = req
        .image
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Recipe image is missing".to_string()))?;

    let image = media::parse_data_url(payload).ok_or_else(|| {
        ApiError::BadRequest("Image must be a base64 image data URL".to_string())
    })?;

    let relative = media::save_image(
        &state.config.media.root,
        "recipes",
        &Uuid::new_v4().to_string(),
        &image,
    )
    .await
    .map_err(|e| ApiError::InternalError(format!("Failed to store image: {}", e)))?;

    let image_url = format!("{}/media/{}", state.config.api.base_url, relative);

    let recipe = Recipe::create(&state.db, auth.user_id, req.into_write(image_url)).await?;

    let mut responses = assemble_responses(&state, vec![recipe], Some(auth.user_id)).await?;

    Ok((StatusCode::CREATED, Json(responses.remove(0))))
}

/// Edit a recipe
///
/// # Errors
///
/// - `403 Forbidden`: caller is not the author
/// - `404 Not Found`: unknown recipe id
pub async fn update_recipe(
    State(state): State<AppState>,
    Extension(auth): Extension<OptionalAuth>,
    Path(id): Path<i64>,
    Json(req): Json<WriteRecipeRequest>,
) -> ApiResult<Json<RecipeResponse>> {
    let auth = auth.require()?;

    let existing = Recipe::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Recipe not found".to_string()))?;

    if existing.author_id != auth.user_id {
        return Err(ApiError::Forbidden(
            "Only the author can edit this recipe".to_string(),
        ));
    }

    req.validate()?;
    req.check_components()?;
    req.check_references(&state).await?;

    let image_url = match req.image.as_deref().filter(|v| !v.is_empty()) {
        Some(payload) => {
            let image = media::parse_data_url(payload).ok_or_else(|| {
                ApiError::BadRequest("Image must be a base64 image data URL".to_string())
            })?;

            let relative = media::save_image(
                &state.config.media.root,
                "recipes",
                &Uuid::new_v4().to_string(),
                &image,
            )
            .await
            .map_err(|e| ApiError::InternalError(format!("Failed to store image: {}", e)))?;

            format!("{}/media/{}", state.config.api.base_url, relative)
        }
        None => existing.image_url.clone(),
    };

    let recipe = Recipe::update(&state.db, id, req.into_write(image_url))
        .await?
        .ok_or_else(|| ApiError::NotFound("Recipe not found".to_string()))?;

    let mut responses = assemble_responses(&state, vec![recipe], Some(auth.user_id)).await?;

    Ok(Json(responses.remove(0)))
}

/// Delete a recipe
///
/// # Errors
///
/// - `403 Forbidden`: caller is not the author
/// - `404 Not Found`: unknown recipe id
pub async fn delete_recipe(
    State(state): State<AppState>,
    Extension(auth): Extension<OptionalAuth>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let auth = auth.require()?;

    let existing = Recipe::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Recipe not found".to_string()))?;

    if existing.author_id != auth.user_id {
        return Err(ApiError::Forbidden(
            "Only the author can delete this recipe".to_string(),
        ));
    }

    Recipe::delete(&state.db, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Adds a recipe to one of the caller's relations
///
/// Shared by the favorite and shopping-cart endpoints; `kind` selects the
/// table.
async fn add_relation(
    state: &AppState,
    kind: RelationKind,
    auth: OptionalAuth,
    recipe_id: i64,
) -> ApiResult<(StatusCode, Json<RecipeShortResponse>)> {
    let auth = auth.require()?;

    let recipe = Recipe::find_by_id(&state.db, recipe_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Recipe not found".to_string()))?;

    let created = RecipeRelation::add(&state.db, kind, auth.user_id, recipe.id).await?;
    if !created {
        return Err(ApiError::BadRequest(format!(
            "Recipe is already in {}",
            kind.noun()
        )));
    }

    Ok((
        StatusCode::CREATED,
        Json(RecipeShortResponse::from_recipe(&recipe)),
    ))
}

/// Removes a recipe from one of the caller's relations
async fn remove_relation(
    state: &AppState,
    kind: RelationKind,
    auth: OptionalAuth,
    recipe_id: i64,
) -> ApiResult<StatusCode> {
    let auth = auth.require()?;

    let recipe = Recipe::find_by_id(&state.db, recipe_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Recipe not found".to_string()))?;

    let removed = RecipeRelation::remove(&state.db, kind, auth.user_id, recipe.id).await?;
    if !removed {
        return Err(ApiError::NotFound(format!(
            "Recipe is not in {}",
            kind.noun()
        )));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Add a recipe to favorites
///
/// # Errors
///
/// - `400 Bad Request`: already favorited
/// - `404 Not Found`: unknown recipe id
pub async fn favorite(
    State(state): State<AppState>,
    Extension(auth): Extension<OptionalAuth>,
    Path(id): Path<i64>,
) -> ApiResult<(StatusCode, Json<RecipeShortResponse>)> {
    add_relation(&state, RelationKind::Favorite, auth, id).await
}

/// Remove a recipe from favorites
///
/// # Errors
///
/// - `404 Not Found`: unknown recipe, or recipe not favorited
pub async fn favorite_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<OptionalAuth>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    remove_relation(&state, RelationKind::Favorite, auth, id).await
}

/// Add a recipe to the shopping cart
///
/// # Errors
///
/// - `400 Bad Request`: already in the cart
/// - `404 Not Found`: unknown recipe id
pub async fn shopping_cart(
    State(state): State<AppState>,
    Extension(auth): Extension<OptionalAuth>,
    Path(id): Path<i64>,
) -> ApiResult<(StatusCode, Json<RecipeShortResponse>)> {
    add_relation(&state, RelationKind::ShoppingCart, auth, id).await
}

/// Remove a recipe from the shopping cart
///
/// # Errors
///
/// - `404 Not Found`: unknown recipe, or recipe not in the cart
pub async fn shopping_cart_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<OptionalAuth>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    remove_relation(&state, RelationKind::ShoppingCart, auth, id).await
}

/// Download the aggregated shopping cart as `cart.txt`
///
/// Aggregates the ingredient amounts across every recipe in the caller's
/// cart and renders them after the recipe names. An empty cart produces a
/// document with empty sections, not an error.
pub async fn download_shopping_cart(
    State(state): State<AppState>,
    Extension(auth): Extension<OptionalAuth>,
) -> ApiResult<Response> {
    let auth = auth.require()?;

    let names = relation::cart_recipe_names(&state.db, auth.user_id).await?;
    let items = relation::aggregate_cart(&state.db, auth.user_id).await?;

    let body = shopping_list::render(&names, &items);

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"cart.txt\"",
            ),
        ],
        body,
    )
        .into_response())
}

/// Short link for a recipe
///
/// Always responds 200, authenticated or not, and does not check that the
/// recipe exists; a link to a missing recipe 404s when followed.
pub async fn get_link(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    let url = format!("{}/s/{}", state.config.api.base_url, id);

    Ok(Json(json!({ "short-link": url })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(ingredients: Vec<IngredientLine>, tags: Vec<i64>) -> WriteRecipeRequest {
        WriteRecipeRequest {
            name: "Pancakes".to_string(),
            text: "Mix and fry.".to_string(),
            cooking_time: 20,
            image: None,
            ingredients,
            tags,
        }
    }

    #[test]
    fn test_empty_ingredients_rejected() {
        let req = request(vec![], vec![1]);
        assert!(req.check_components().is_err());
    }

    #[test]
    fn test_empty_tags_rejected() {
        let req = request(vec![IngredientLine { id: 1, amount: 100 }], vec![]);
        assert!(req.check_components().is_err());
    }

    #[test]
    fn test_duplicate_ingredient_rejected() {
        let req = request(
            vec![
                IngredientLine { id: 1, amount: 100 },
                IngredientLine { id: 1, amount: 50 },
            ],
            vec![1],
        );
        assert!(req.check_components().is_err());
    }

    #[test]
    fn test_zero_amount_rejected() {
        let req = request(vec![IngredientLine { id: 1, amount: 0 }], vec![1]);
        assert!(req.check_components().is_err());
    }

    #[test]
    fn test_well_formed_components_accepted() {
        let req = request(
            vec![
                IngredientLine { id: 1, amount: 100 },
                IngredientLine { id: 2, amount: 50 },
            ],
            vec![1, 2],
        );
        assert!(req.check_components().is_ok());
    }

    #[test]
    fn test_cooking_time_validation() {
        let mut req = request(vec![IngredientLine { id: 1, amount: 100 }], vec![1]);
        req.cooking_time = 0;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_flag_parsing() {
        assert!(is_truthy(&Some("1".to_string())));
        assert!(is_truthy(&Some("true".to_string())));
        assert!(!is_truthy(&Some("0".to_string())));
        assert!(!is_truthy(&None));
    }
}
