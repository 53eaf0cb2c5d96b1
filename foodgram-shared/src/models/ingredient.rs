/// Ingredient reference model
///
/// Ingredients are a canonical reference list: a (name, measurement unit)
/// pair is unique, and recipes attach amounts to them through
/// `recipe_ingredients`.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE ingredients (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(128) NOT NULL,
///     measurement_unit VARCHAR(64) NOT NULL,
///     CONSTRAINT uq_ingredient_name_unit UNIQUE (name, measurement_unit)
/// );
/// ```

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Canonical ingredient
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Ingredient {
    /// Unique ingredient id
    pub id: i64,

    /// Ingredient name
    pub name: String,

    /// Unit the amount is measured in ("g", "ml", "pcs")
    pub measurement_unit: String,
}

impl Ingredient {
    /// Lists ingredients, optionally filtered by a case-insensitive name prefix
    pub async fn list(pool: &PgPool, name_prefix: Option<&str>) -> Result<Vec<Self>, sqlx::Error> {
        match name_prefix {
            Some(prefix) => {
                // Escape LIKE metacharacters so a literal "%" in the query
                // cannot widen the match.
                let escaped = prefix.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");

                sqlx::query_as::<_, Ingredient>(
                    "SELECT id, name, measurement_unit FROM ingredients
                     WHERE name ILIKE $1 || '%'
                     ORDER BY name, id",
                )
                .bind(escaped)
                .fetch_all(pool)
                .await
            }
            None => {
                sqlx::query_as::<_, Ingredient>(
                    "SELECT id, name, measurement_unit FROM ingredients ORDER BY name, id",
                )
                .fetch_all(pool)
                .await
            }
        }
    }

    /// Finds an ingredient by id
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Ingredient>(
            "SELECT id, name, measurement_unit FROM ingredients WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Fetches a batch of ingredients by id
    pub async fn find_by_ids(pool: &PgPool, ids: &[i64]) -> Result<Vec<Self>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, Ingredient>(
            "SELECT id, name, measurement_unit FROM ingredients WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(pool)
        .await
    }
}
