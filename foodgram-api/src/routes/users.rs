/// User endpoints: profiles, avatars, subscriptions
///
/// # Endpoints
///
/// - `GET /api/users` - List users (paginated, public)
/// - `GET /api/users/:id` - Retrieve a user (public)
/// - `GET /api/users/me` - Current user profile
/// - `PUT /api/users/me/avatar` - Set avatar from an inline image
/// - `DELETE /api/users/me/avatar` - Remove avatar
/// - `GET /api/users/subscriptions` - Authors the caller follows
/// - `POST /api/users/:id/subscribe` - Subscribe to an author
/// - `DELETE /api/users/:id/subscribe` - Unsubscribe from an author

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    media,
    routes::recipes::RecipeShortResponse,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use foodgram_shared::{
    auth::middleware::{AuthContext, OptionalAuth},
    models::{recipe::Recipe, subscription::Subscription, user::User},
    pagination::{Page, PageQuery, Paginated},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

/// Public user projection
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    /// User id
    pub id: Uuid,

    /// Email address
    pub email: String,

    /// Public handle
    pub username: String,

    /// Given name
    pub first_name: String,

    /// Family name
    pub last_name: String,

    /// Whether the caller subscribes to this user
    pub is_subscribed: bool,

    /// Avatar URL, if one is set
    pub avatar: Option<String>,
}

impl UserResponse {
    /// Builds the projection for a user as seen by the caller
    pub fn from_user(user: &User, is_subscribed: bool) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_subscribed,
            avatar: user.avatar_url.clone(),
        }
    }
}

/// Author projection used by the subscription endpoints
///
/// Extends the public user projection with the author's recipes (capped
/// by `recipes_limit`) and their total recipe count.
#[derive(Debug, Serialize)]
pub struct SubscribedAuthorResponse {
    /// The author's public projection
    #[serde(flatten)]
    pub user: UserResponse,

    /// The author's most recent recipes, possibly capped
    pub recipes: Vec<RecipeShortResponse>,

    /// Total number of recipes the author has published
    pub recipes_count: i64,
}

/// Query parameters for the subscription endpoints
#[derive(Debug, Default, Deserialize)]
pub struct SubscriptionQuery {
    /// 1-based page number
    pub page: Option<u32>,

    /// Requested page size
    pub limit: Option<u32>,

    /// Cap on the number of recipes embedded per author
    pub recipes_limit: Option<i64>,
}

/// Builds subscription projections for a batch of authors
///
/// The caller follows every author passed in, so `is_subscribed` is
/// always true here.
async fn author_projections(
    state: &AppState,
    authors: &[User],
    recipes_limit: Option<i64>,
) -> ApiResult<Vec<SubscribedAuthorResponse>> {
    let author_ids: Vec<Uuid> = authors.iter().map(|a| a.id).collect();
    let counts = Recipe::counts_by_authors(&state.db, &author_ids).await?;

    let mut projections = Vec::with_capacity(authors.len());
    for author in authors {
        let recipes = Recipe::list_by_author(&state.db, author.id, recipes_limit).await?;

        projections.push(SubscribedAuthorResponse {
            user: UserResponse::from_user(author, true),
            recipes: recipes.iter().map(RecipeShortResponse::from_recipe).collect(),
            recipes_count: counts.get(&author.id).copied().unwrap_or(0),
        });
    }

    Ok(projections)
}

/// List users (paginated)
///
/// Public; `is_subscribed` flags are personalized when the caller is
/// authenticated.
pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<OptionalAuth>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Paginated<UserResponse>>> {
    let page = Page::resolve(
        query,
        state.config.pagination.default_page_size,
        state.config.pagination.max_page_size,
    );

    let count = User::count(&state.db).await?;
    let users = User::list(&state.db, page.limit(), page.offset()).await?;

    let following = match auth.user_id() {
        Some(viewer) => {
            let ids: Vec<Uuid> = users.iter().map(|u| u.id).collect();
            Subscription::following_among(&state.db, viewer, &ids).await?
        }
        None => Default::default(),
    };

    let results = users
        .iter()
        .map(|u| UserResponse::from_user(u, following.contains(&u.id)))
        .collect();

    Ok(Json(Paginated::new(count, page, "/api/users", results)))
}

/// Retrieve a user by id
///
/// # Errors
///
/// - `404 Not Found`: unknown user id
pub async fn get_user(
    State(state): State<AppState>,
    Extension(auth): Extension<OptionalAuth>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserResponse>> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let is_subscribed = match auth.user_id() {
        Some(viewer) => Subscription::following_among(&state.db, viewer, &[user.id])
            .await?
            .contains(&user.id),
        None => false,
    };

    Ok(Json(UserResponse::from_user(&user, is_subscribed)))
}

/// Current user profile
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<UserResponse>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserResponse::from_user(&user, false)))
}

/// Avatar upload request
#[derive(Debug, Deserialize)]
pub struct AvatarRequest {
    /// Inline image as a `data:<mime>;base64,...` URL
    pub avatar: Option<String>,
}

/// Set the current user's avatar
///
/// # Endpoint
///
/// ```text
/// PUT /api/users/me/avatar
/// Content-Type: application/json
///
/// { "avatar": "data:image/png;base64,iVBOR..." }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: missing or undecodable image payload
pub async fn put_avatar(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<AvatarRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let payload = match req.avatar.as_deref() {
        Some(value) if !value.is_empty() => value,
        _ => return Err(ApiError::BadRequest("Avatar file is missing".to_string())),
    };

    let image = media::parse_data_url(payload).ok_or_else(|| {
        ApiError::BadRequest("Avatar must be a base64 image data URL".to_string())
    })?;

    let relative = media::save_image(
        &state.config.media.root,
        "avatars",
        &auth.user_id.to_string(),
        &image,
    )
    .await
    .map_err(|e| ApiError::InternalError(format!("Failed to store avatar: {}", e)))?;

    let url = format!("{}/media/{}", state.config.api.base_url, relative);

    let updated = User::set_avatar(&state.db, auth.user_id, &url).await?;
    if !updated {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    Ok(Json(json!({ "avatar": url })))
}

/// Remove the current user's avatar
///
/// The column is cleared in a single atomic statement; the stored file is
/// removed afterwards on a best-effort basis.
///
/// # Errors
///
/// - `400 Bad Request`: no avatar is set
pub async fn delete_avatar(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<StatusCode> {
    let previous = User::clear_avatar(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::BadRequest("Avatar is not set".to_string()))?;

    media::remove_by_url(&state.config.media.root, "avatars", &previous).await;

    Ok(StatusCode::NO_CONTENT)
}

/// Authors the caller follows (paginated)
pub async fn list_subscriptions(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<SubscriptionQuery>,
) -> ApiResult<Json<Paginated<SubscribedAuthorResponse>>> {
    let page = Page::resolve(
        PageQuery {
            page: query.page,
            limit: query.limit,
        },
        state.config.pagination.default_page_size,
        state.config.pagination.max_page_size,
    );

    let count = Subscription::count_authors(&state.db, auth.user_id).await?;
    let authors =
        Subscription::authors(&state.db, auth.user_id, page.limit(), page.offset()).await?;

    let results = author_projections(&state, &authors, query.recipes_limit).await?;

    Ok(Json(Paginated::new(
        count,
        page,
        "/api/users/subscriptions",
        results,
    )))
}

/// Subscribe to an author
///
/// # Errors
///
/// - `400 Bad Request`: self-subscription or already subscribed
/// - `404 Not Found`: unknown author id
pub async fn subscribe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Query(query): Query<SubscriptionQuery>,
) -> ApiResult<(StatusCode, Json<SubscribedAuthorResponse>)> {
    let author = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if author.id == auth.user_id {
        return Err(ApiError::BadRequest(
            "Cannot subscribe to yourself".to_string(),
        ));
    }

    let created = Subscription::create(&state.db, auth.user_id, author.id).await?;
    if !created {
        return Err(ApiError::BadRequest(
            "Already subscribed to this user".to_string(),
        ));
    }

    let mut projections =
        author_projections(&state, std::slice::from_ref(&author), query.recipes_limit).await?;

    Ok((StatusCode::CREATED, Json(projections.remove(0))))
}

/// Unsubscribe from an author
///
/// # Errors
///
/// - `404 Not Found`: the subscription does not exist
pub async fn unsubscribe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let deleted = Subscription::delete(&state.db, auth.user_id, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Subscription not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
