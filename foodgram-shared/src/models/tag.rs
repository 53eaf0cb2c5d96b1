/// Tag model
///
/// Tags are a small, admin-curated vocabulary ("breakfast", "dinner") that
/// recipes reference through the `recipe_tags` join table. The public API
/// only ever reads them.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tags (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(32) NOT NULL UNIQUE,
///     slug VARCHAR(32) NOT NULL UNIQUE
/// );
/// ```

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Recipe tag
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    /// Unique tag id
    pub id: i64,

    /// Display name, unique
    pub name: String,

    /// URL-safe identifier, unique
    pub slug: String,
}

impl Tag {
    /// Lists every tag, ordered by id
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Tag>("SELECT id, name, slug FROM tags ORDER BY id")
            .fetch_all(pool)
            .await
    }

    /// Finds a tag by id
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Tag>("SELECT id, name, slug FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Fetches a batch of tags by id
    ///
    /// Missing ids are silently absent from the result; callers validate
    /// the count when existence matters.
    pub async fn find_by_ids(pool: &PgPool, ids: &[i64]) -> Result<Vec<Self>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, Tag>("SELECT id, name, slug FROM tags WHERE id = ANY($1) ORDER BY id")
            .bind(ids)
            .fetch_all(pool)
            .await
    }
}
