/// Subscription model: (follower, author) relations between users
///
/// Uniqueness and the no-self-subscription rule are enforced by the
/// database (`UNIQUE (follower_id, author_id)` plus a CHECK constraint);
/// the application rejects self-subscription up front to return a clear
/// message, while the constraints stay authoritative under races.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE subscriptions (
///     id BIGSERIAL PRIMARY KEY,
///     follower_id UUID NOT NULL REFERENCES users (id) ON DELETE CASCADE,
///     author_id UUID NOT NULL REFERENCES users (id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT uq_subscription_pair UNIQUE (follower_id, author_id),
///     CONSTRAINT ck_no_self_subscription CHECK (follower_id <> author_id)
/// );
/// ```

use sqlx::PgPool;
use std::collections::HashSet;
use uuid::Uuid;

use super::user::User;

/// Operations over the subscriptions table
pub struct Subscription;

impl Subscription {
    /// Creates the (follower, author) pair
    ///
    /// Returns false when the pair already exists; the unique constraint
    /// decides, so concurrent subscribes cannot double-insert.
    pub async fn create(
        pool: &PgPool,
        follower_id: Uuid,
        author_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO subscriptions (follower_id, author_id)
             VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(follower_id)
        .bind(author_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Deletes the (follower, author) pair
    ///
    /// Returns false when no such pair existed.
    pub async fn delete(
        pool: &PgPool,
        follower_id: Uuid,
        author_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM subscriptions WHERE follower_id = $1 AND author_id = $2",
        )
        .bind(follower_id)
        .bind(author_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// The authors a follower subscribes to, in subscription order
    pub async fn authors(
        pool: &PgPool,
        follower_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT u.id, u.email, u.username, u.first_name, u.last_name, u.password_hash,
                    u.avatar_url, u.created_at, u.updated_at
             FROM subscriptions s
             JOIN users u ON u.id = s.author_id
             WHERE s.follower_id = $1
             ORDER BY s.id
             LIMIT $2 OFFSET $3",
        )
        .bind(follower_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Number of authors the follower subscribes to
    pub async fn count_authors(pool: &PgPool, follower_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM subscriptions WHERE follower_id = $1")
            .bind(follower_id)
            .fetch_one(pool)
            .await
    }

    /// Of the given authors, the subset the follower subscribes to
    ///
    /// Used to stamp `is_subscribed` flags onto user listings with one
    /// query.
    pub async fn following_among(
        pool: &PgPool,
        follower_id: Uuid,
        author_ids: &[Uuid],
    ) -> Result<HashSet<Uuid>, sqlx::Error> {
        if author_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let rows: Vec<(Uuid,)> = sqlx::query_as(
            "SELECT author_id FROM subscriptions
             WHERE follower_id = $1 AND author_id = ANY($2)",
        )
        .bind(follower_id)
        .bind(author_ids)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
