/// Recipe model and database operations
///
/// A recipe belongs to one author, references ingredients with amounts
/// through `recipe_ingredients`, and tags through `recipe_tags`. Creation
/// and update write all three tables inside one transaction, so a recipe
/// is never visible with half of its ingredient list.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE recipes (
///     id BIGSERIAL PRIMARY KEY,
///     author_id UUID NOT NULL REFERENCES users (id) ON DELETE CASCADE,
///     name VARCHAR(256) NOT NULL,
///     image_url VARCHAR(512) NOT NULL,
///     text TEXT NOT NULL,
///     cooking_time INTEGER NOT NULL CHECK (cooking_time >= 1),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashMap;
use uuid::Uuid;

/// Columns selected for every recipe query
const RECIPE_COLUMNS: &str = "r.id, r.author_id, r.name, r.image_url, r.text, r.cooking_time, \
                              r.created_at";

/// Recipe row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Recipe {
    /// Unique recipe id
    pub id: i64,

    /// Owning author
    pub author_id: Uuid,

    /// Recipe name
    pub name: String,

    /// URL of the dish photo
    pub image_url: String,

    /// Preparation instructions
    pub text: String,

    /// Cooking time in minutes, at least 1
    pub cooking_time: i32,

    /// When the recipe was published
    pub created_at: DateTime<Utc>,
}

/// One ingredient line of a recipe being written
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IngredientAmount {
    /// Referenced ingredient id
    pub ingredient_id: i64,

    /// Amount in the ingredient's measurement unit, at least 1
    pub amount: i32,
}

/// Input for creating or replacing a recipe
///
/// Updates replace the ingredient and tag sets wholesale; there is no
/// partial merge of ingredient lines.
#[derive(Debug, Clone)]
pub struct WriteRecipe {
    /// Recipe name
    pub name: String,

    /// URL of the stored dish photo
    pub image_url: String,

    /// Preparation instructions
    pub text: String,

    /// Cooking time in minutes
    pub cooking_time: i32,

    /// Ingredient lines, already validated as non-empty and duplicate-free
    pub ingredients: Vec<IngredientAmount>,

    /// Tag ids, already validated as existing
    pub tag_ids: Vec<i64>,
}

/// Filters for the recipe listing
#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    /// Only recipes by this author
    pub author: Option<Uuid>,

    /// Only recipes carrying at least one of these tag slugs
    pub tag_slugs: Vec<String>,

    /// Only recipes favorited by this user
    pub favorited_by: Option<Uuid>,

    /// Only recipes in this user's shopping cart
    pub in_cart_of: Option<Uuid>,
}

impl RecipeFilter {
    /// Appends WHERE clauses for the active filters, numbering binds from
    /// `first_bind`. Returns the clause string (possibly empty) and the
    /// next free bind number.
    fn where_clause(&self, first_bind: usize) -> (String, usize) {
        let mut clauses = Vec::new();
        let mut bind = first_bind;

        if self.author.is_some() {
            clauses.push(format!("r.author_id = ${bind}"));
            bind += 1;
        }
        if !self.tag_slugs.is_empty() {
            clauses.push(format!(
                "r.id IN (SELECT rt.recipe_id FROM recipe_tags rt \
                 JOIN tags t ON t.id = rt.tag_id WHERE t.slug = ANY(${bind}))"
            ));
            bind += 1;
        }
        if self.favorited_by.is_some() {
            clauses.push(format!(
                "r.id IN (SELECT f.recipe_id FROM favorites f WHERE f.user_id = ${bind})"
            ));
            bind += 1;
        }
        if self.in_cart_of.is_some() {
            clauses.push(format!(
                "r.id IN (SELECT sc.recipe_id FROM shopping_cart sc WHERE sc.user_id = ${bind})"
            ));
            bind += 1;
        }

        if clauses.is_empty() {
            (String::new(), bind)
        } else {
            (format!(" WHERE {}", clauses.join(" AND ")), bind)
        }
    }
}

/// One ingredient line of a stored recipe, joined with its reference data
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RecipeIngredientDetail {
    /// Recipe the line belongs to
    pub recipe_id: i64,

    /// Referenced ingredient id
    pub ingredient_id: i64,

    /// Ingredient name
    pub name: String,

    /// Measurement unit
    pub measurement_unit: String,

    /// Amount in the measurement unit
    pub amount: i32,
}

/// A tag attached to a recipe
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RecipeTagDetail {
    /// Recipe the tag is attached to
    pub recipe_id: i64,

    /// Tag id
    pub id: i64,

    /// Tag name
    pub name: String,

    /// Tag slug
    pub slug: String,
}

impl Recipe {
    /// Creates a recipe with its ingredient amounts and tags in one transaction
    pub async fn create(
        pool: &PgPool,
        author_id: Uuid,
        data: WriteRecipe,
    ) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let sql = format!(
            "INSERT INTO recipes (author_id, name, image_url, text, cooking_time)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            RECIPE_COLUMNS.replace("r.", "")
        );

        let recipe = sqlx::query_as::<_, Recipe>(&sql)
            .bind(author_id)
            .bind(&data.name)
            .bind(&data.image_url)
            .bind(&data.text)
            .bind(data.cooking_time)
            .fetch_one(&mut *tx)
            .await?;

        Self::write_components(&mut tx, recipe.id, &data).await?;

        tx.commit().await?;

        Ok(recipe)
    }

    /// Replaces a recipe and its ingredient/tag sets in one transaction
    ///
    /// Returns None when the recipe does not exist. Authorization is the
    /// caller's concern; this function only writes.
    pub async fn update(
        pool: &PgPool,
        id: i64,
        data: WriteRecipe,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let sql = format!(
            "UPDATE recipes SET name = $2, image_url = $3, text = $4, cooking_time = $5
             WHERE id = $1
             RETURNING {}",
            RECIPE_COLUMNS.replace("r.", "")
        );

        let recipe = sqlx::query_as::<_, Recipe>(&sql)
            .bind(id)
            .bind(&data.name)
            .bind(&data.image_url)
            .bind(&data.text)
            .bind(data.cooking_time)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(recipe) = recipe else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        Self::write_components(&mut tx, id, &data).await?;

        tx.commit().await?;

        Ok(Some(recipe))
    }

    /// Inserts the ingredient amounts and tag links for a recipe
    async fn write_components(
        tx: &mut Transaction<'_, Postgres>,
        recipe_id: i64,
        data: &WriteRecipe,
    ) -> Result<(), sqlx::Error> {
        let ingredient_ids: Vec<i64> = data.ingredients.iter().map(|i| i.ingredient_id).collect();
        let amounts: Vec<i32> = data.ingredients.iter().map(|i| i.amount).collect();

        sqlx::query(
            "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount)
             SELECT $1, ingredient_id, amount
             FROM UNNEST($2::BIGINT[], $3::INTEGER[]) AS t (ingredient_id, amount)",
        )
        .bind(recipe_id)
        .bind(&ingredient_ids)
        .bind(&amounts)
        .execute(&mut **tx)
        .await?;

        if !data.tag_ids.is_empty() {
            sqlx::query(
                "INSERT INTO recipe_tags (recipe_id, tag_id)
                 SELECT $1, tag_id FROM UNNEST($2::BIGINT[]) AS t (tag_id)",
            )
            .bind(recipe_id)
            .bind(&data.tag_ids)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }

    /// Deletes a recipe
    ///
    /// Returns true if a row was removed. Ingredient amounts, tag links
    /// and relation rows cascade at the database level.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Finds a recipe by id
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {RECIPE_COLUMNS} FROM recipes r WHERE r.id = $1");

        sqlx::query_as::<_, Recipe>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lists recipes matching the filter, newest first
    pub async fn list(
        pool: &PgPool,
        filter: &RecipeFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let (where_clause, next_bind) = filter.where_clause(1);
        let sql = format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes r{where_clause}
             ORDER BY r.created_at DESC, r.id DESC
             LIMIT ${} OFFSET ${}",
            next_bind,
            next_bind + 1
        );

        let mut query = sqlx::query_as::<_, Recipe>(&sql);
        query = Self::bind_filter(query, filter);

        query.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Counts recipes matching the filter
    pub async fn count(pool: &PgPool, filter: &RecipeFilter) -> Result<i64, sqlx::Error> {
        let (where_clause, _) = filter.where_clause(1);
        let sql = format!("SELECT COUNT(*) FROM recipes r{where_clause}");

        let mut query = sqlx::query_scalar::<_, i64>(&sql);

        if let Some(author) = filter.author {
            query = query.bind(author);
        }
        if !filter.tag_slugs.is_empty() {
            query = query.bind(&filter.tag_slugs);
        }
        if let Some(user) = filter.favorited_by {
            query = query.bind(user);
        }
        if let Some(user) = filter.in_cart_of {
            query = query.bind(user);
        }

        query.fetch_one(pool).await
    }

    /// Binds the filter values in the same order `where_clause` numbered them
    fn bind_filter<'q>(
        mut query: sqlx::query::QueryAs<'q, Postgres, Recipe, sqlx::postgres::PgArguments>,
        filter: &'q RecipeFilter,
    ) -> sqlx::query::QueryAs<'q, Postgres, Recipe, sqlx::postgres::PgArguments> {
        if let Some(author) = filter.author {
            query = query.bind(author);
        }
        if !filter.tag_slugs.is_empty() {
            query = query.bind(&filter.tag_slugs);
        }
        if let Some(user) = filter.favorited_by {
            query = query.bind(user);
        }
        if let Some(user) = filter.in_cart_of {
            query = query.bind(user);
        }
        query
    }

    /// Lists an author's recipes, newest first, optionally capped
    pub async fn list_by_author(
        pool: &PgPool,
        author_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes r
             WHERE r.author_id = $1
             ORDER BY r.created_at DESC, r.id DESC
             LIMIT $2"
        );

        sqlx::query_as::<_, Recipe>(&sql)
            .bind(author_id)
            .bind(limit.unwrap_or(i64::MAX))
            .fetch_all(pool)
            .await
    }

    /// Recipe counts per author for a batch of authors
    pub async fn counts_by_authors(
        pool: &PgPool,
        author_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, i64>, sqlx::Error> {
        if author_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(Uuid, i64)> = sqlx::query_as(
            "SELECT author_id, COUNT(*) FROM recipes
             WHERE author_id = ANY($1)
             GROUP BY author_id",
        )
        .bind(author_ids)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().collect())
    }

    /// Ingredient lines for a batch of recipes, joined with reference data
    pub async fn ingredients_for(
        pool: &PgPool,
        recipe_ids: &[i64],
    ) -> Result<Vec<RecipeIngredientDetail>, sqlx::Error> {
        if recipe_ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, RecipeIngredientDetail>(
            "SELECT ri.recipe_id, ri.ingredient_id, i.name, i.measurement_unit, ri.amount
             FROM recipe_ingredients ri
             JOIN ingredients i ON i.id = ri.ingredient_id
             WHERE ri.recipe_id = ANY($1)
             ORDER BY ri.recipe_id, ri.id",
        )
        .bind(recipe_ids)
        .fetch_all(pool)
        .await
    }

    /// Tags for a batch of recipes
    pub async fn tags_for(
        pool: &PgPool,
        recipe_ids: &[i64],
    ) -> Result<Vec<RecipeTagDetail>, sqlx::Error> {
        if recipe_ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, RecipeTagDetail>(
            "SELECT rt.recipe_id, t.id, t.name, t.slug
             FROM recipe_tags rt
             JOIN tags t ON t.id = rt.tag_id
             WHERE rt.recipe_id = ANY($1)
             ORDER BY rt.recipe_id, t.id",
        )
        .bind(recipe_ids)
        .fetch_all(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_has_no_where_clause() {
        let filter = RecipeFilter::default();
        let (clause, next_bind) = filter.where_clause(1);

        assert!(clause.is_empty());
        assert_eq!(next_bind, 1);
    }

    #[test]
    fn test_filter_bind_numbering() {
        let filter = RecipeFilter {
            author: Some(Uuid::new_v4()),
            tag_slugs: vec!["breakfast".to_string()],
            favorited_by: Some(Uuid::new_v4()),
            in_cart_of: None,
        };
        let (clause, next_bind) = filter.where_clause(1);

        assert!(clause.starts_with(" WHERE "));
        assert!(clause.contains("r.author_id = $1"));
        assert!(clause.contains("t.slug = ANY($2)"));
        assert!(clause.contains("f.user_id = $3"));
        assert_eq!(next_bind, 4);
    }

    #[test]
    fn test_filter_skips_inactive_binds() {
        let filter = RecipeFilter {
            in_cart_of: Some(Uuid::new_v4()),
            ..Default::default()
        };
        let (clause, next_bind) = filter.where_clause(1);

        assert!(clause.contains("sc.user_id = $1"));
        assert_eq!(next_bind, 2);
    }
}
