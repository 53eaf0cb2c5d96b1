/// Short-link redirect target
///
/// `/s/:id` is the URL handed out by the get-link endpoint; it redirects
/// to the recipe page. Like get-link itself, it does not verify that the
/// recipe exists - the destination page is responsible for its own 404.

use crate::app::AppState;
use axum::{
    extract::{Path, State},
    response::Redirect,
};

/// Redirects a short link to the recipe page
pub async fn resolve(State(state): State<AppState>, Path(id): Path<i64>) -> Redirect {
    Redirect::temporary(&format!("{}/recipes/{}", state.config.api.base_url, id))
}
