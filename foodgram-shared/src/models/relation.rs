/// Per-user recipe relations: favorites and the shopping cart
///
/// Both relations are (user, recipe) pairs with identical semantics; they
/// differ only in which table holds the rows. `RelationKind` selects the
/// table, and one parameterized set of operations serves both.
///
/// Adds rely on the unique index, not a prior existence check: the insert
/// uses `ON CONFLICT DO NOTHING` and reports whether a row was written, so
/// two concurrent adds for the same pair resolve to exactly one creation.
///
/// The shopping-cart aggregation queries also live here: they combine the
/// ingredient amounts of every recipe in a user's cart, grouped by
/// (ingredient name, measurement unit).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE favorites (
///     id BIGSERIAL PRIMARY KEY,
///     user_id UUID NOT NULL REFERENCES users (id) ON DELETE CASCADE,
///     recipe_id BIGINT NOT NULL REFERENCES recipes (id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT uq_favorite_user_recipe UNIQUE (user_id, recipe_id)
/// );
/// -- shopping_cart is identical up to table and constraint names
/// ```

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::HashSet;
use uuid::Uuid;

/// Discriminator selecting which relation table an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// The `favorites` table
    Favorite,

    /// The `shopping_cart` table
    ShoppingCart,
}

impl RelationKind {
    /// Table addressed by this kind
    ///
    /// Only ever interpolated into SQL as one of these two literals; user
    /// input never reaches the table name.
    pub fn table(self) -> &'static str {
        match self {
            RelationKind::Favorite => "favorites",
            RelationKind::ShoppingCart => "shopping_cart",
        }
    }

    /// Human-readable name used in error messages
    pub fn noun(self) -> &'static str {
        match self {
            RelationKind::Favorite => "favorites",
            RelationKind::ShoppingCart => "shopping cart",
        }
    }
}

/// Parameterized operations over the two relation tables
pub struct RecipeRelation;

impl RecipeRelation {
    /// Adds the (user, recipe) pair to the relation
    ///
    /// Returns false when the pair already exists. The unique constraint
    /// is the source of truth: under two concurrent adds exactly one
    /// caller sees true.
    pub async fn add(
        pool: &PgPool,
        kind: RelationKind,
        user_id: Uuid,
        recipe_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let sql = format!(
            "INSERT INTO {} (user_id, recipe_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            kind.table()
        );

        let result = sqlx::query(&sql)
            .bind(user_id)
            .bind(recipe_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Removes the (user, recipe) pair from the relation
    ///
    /// Returns false when no such pair existed.
    pub async fn remove(
        pool: &PgPool,
        kind: RelationKind,
        user_id: Uuid,
        recipe_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let sql = format!(
            "DELETE FROM {} WHERE user_id = $1 AND recipe_id = $2",
            kind.table()
        );

        let result = sqlx::query(&sql)
            .bind(user_id)
            .bind(recipe_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Of the given recipes, the subset present in the user's relation
    ///
    /// Used to stamp `is_favorited` / `is_in_shopping_cart` flags onto a
    /// page of recipes with a single query per kind.
    pub async fn contained_ids(
        pool: &PgPool,
        kind: RelationKind,
        user_id: Uuid,
        recipe_ids: &[i64],
    ) -> Result<HashSet<i64>, sqlx::Error> {
        if recipe_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let sql = format!(
            "SELECT recipe_id FROM {} WHERE user_id = $1 AND recipe_id = ANY($2)",
            kind.table()
        );

        let rows: Vec<(i64,)> = sqlx::query_as(&sql)
            .bind(user_id)
            .bind(recipe_ids)
            .fetch_all(pool)
            .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}

/// One line of the aggregated shopping cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CartIngredient {
    /// Ingredient name
    pub name: String,

    /// Measurement unit the total is expressed in
    pub measurement_unit: String,

    /// Summed amount across every cart recipe using this ingredient
    pub total_amount: i64,
}

/// Aggregates the ingredient amounts of every recipe in the user's cart
///
/// Grouped by (ingredient name, measurement unit), summed, and ordered
/// ascending by name under the database collation. An empty cart yields
/// an empty vector.
pub async fn aggregate_cart(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<CartIngredient>, sqlx::Error> {
    sqlx::query_as::<_, CartIngredient>(
        "SELECT i.name, i.measurement_unit, SUM(ri.amount) AS total_amount
         FROM shopping_cart sc
         JOIN recipe_ingredients ri ON ri.recipe_id = sc.recipe_id
         JOIN ingredients i ON i.id = ri.ingredient_id
         WHERE sc.user_id = $1
         GROUP BY i.name, i.measurement_unit
         ORDER BY i.name",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Names of the recipes in the user's cart, in cart-entry insertion order
pub async fn cart_recipe_names(pool: &PgPool, user_id: Uuid) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT r.name
         FROM shopping_cart sc
         JOIN recipes r ON r.id = sc.recipe_id
         WHERE sc.user_id = $1
         ORDER BY sc.id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_selects_table() {
        assert_eq!(RelationKind::Favorite.table(), "favorites");
        assert_eq!(RelationKind::ShoppingCart.table(), "shopping_cart");
    }

    #[test]
    fn test_kind_noun_for_messages() {
        assert_eq!(RelationKind::Favorite.noun(), "favorites");
        assert_eq!(RelationKind::ShoppingCart.noun(), "shopping cart");
    }
}
