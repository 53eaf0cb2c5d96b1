/// Application state and router builder
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                          # Health check (public)
/// ├── /s/:id                           # Short-link redirect (public)
/// ├── /media/*                         # Uploaded images (static files)
/// └── /api/
///     ├── /auth/                       # register, login, refresh (public)
///     ├── /tags/                       # read-only (public)
///     ├── /ingredients/                # read-only (public)
///     ├── /recipes/                    # reads public, writes authenticated
///     └── /users/                      # profiles, avatar, subscriptions
/// ```
///
/// # Auth Layers
///
/// Two middleware layers resolve the acting user before handlers run:
/// `auth_layer` rejects anonymous callers and injects `AuthContext`;
/// `optional_auth_layer` injects `OptionalAuth` and lets anonymous
/// callers through. Recipe routes mix public reads and authenticated
/// writes on the same paths, so the whole group runs under the optional
/// layer and mutating handlers upgrade with `OptionalAuth::require`.

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post, put},
    Router,
};
use foodgram_shared::auth::{
    jwt,
    middleware::{bearer_token, AuthContext, OptionalAuth},
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned into each request handler via Axum's `State` extractor; the
/// config sits behind an Arc so cloning stays cheap.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Public, no auth context needed
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    let tag_routes = Router::new()
        .route("/", get(routes::tags::list_tags))
        .route("/:id", get(routes::tags::get_tag));

    let ingredient_routes = Router::new()
        .route("/", get(routes::ingredients::list_ingredients))
        .route("/:id", get(routes::ingredients::get_ingredient));

    // Reads are public but personalized, writes require auth; the whole
    // group resolves the acting user optionally and mutating handlers
    // upgrade via require()
    let recipe_routes = Router::new()
        .route(
            "/",
            get(routes::recipes::list_recipes).post(routes::recipes::create_recipe),
        )
        .route(
            "/download_shopping_cart",
            get(routes::recipes::download_shopping_cart),
        )
        .route(
            "/:id",
            get(routes::recipes::get_recipe)
                .patch(routes::recipes::update_recipe)
                .delete(routes::recipes::delete_recipe),
        )
        .route(
            "/:id/favorite",
            post(routes::recipes::favorite).delete(routes::recipes::favorite_delete),
        )
        .route(
            "/:id/shopping_cart",
            post(routes::recipes::shopping_cart).delete(routes::recipes::shopping_cart_delete),
        )
        .route("/:id/get-link", get(routes::recipes::get_link))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            optional_auth_layer,
        ));

    let user_public_routes = Router::new()
        .route("/", get(routes::users::list_users))
        .route("/:id", get(routes::users::get_user))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            optional_auth_layer,
        ));

    let user_private_routes = Router::new()
        .route("/me", get(routes::users::me))
        .route(
            "/me/avatar",
            put(routes::users::put_avatar).delete(routes::users::delete_avatar),
        )
        .route("/subscriptions", get(routes::users::list_subscriptions))
        .route(
            "/:id/subscribe",
            post(routes::users::subscribe).delete(routes::users::unsubscribe),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_layer,
        ));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/tags", tag_routes)
        .nest("/ingredients", ingredient_routes)
        .nest("/recipes", recipe_routes)
        .nest("/users", user_public_routes.merge(user_private_routes));

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .route("/s/:id", get(routes::short_link::resolve))
        .nest_service("/media", ServeDir::new(&state.config.media.root))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// Required-auth middleware layer
///
/// Validates the Bearer access token and injects `AuthContext` into the
/// request extensions; anonymous or invalid callers get 401 before any
/// handler runs.
async fn auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = {
        let token = bearer_token(req.headers())?;
        jwt::validate_access_token(token, state.jwt_secret())?
    };

    req.extensions_mut()
        .insert(AuthContext::from_claims(claims.sub));

    Ok(next.run(req).await)
}

/// Optional-auth middleware layer
///
/// Resolves the acting user when a valid Bearer token is present and
/// injects `OptionalAuth`; anonymous callers pass through with `None`.
/// Invalid tokens are treated as anonymous rather than rejected, matching
/// the behavior of public pages that merely personalize their content.
async fn optional_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let auth = {
        match bearer_token(req.headers()) {
            Ok(token) => jwt::validate_access_token(token, state.jwt_secret())
                .ok()
                .map(|claims| AuthContext::from_claims(claims.sub)),
            Err(_) => None,
        }
    };

    req.extensions_mut().insert(OptionalAuth(auth));

    next.run(req).await
}
