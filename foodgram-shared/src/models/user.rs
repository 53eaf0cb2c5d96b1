/// User model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email CITEXT NOT NULL UNIQUE,
///     username VARCHAR(150) NOT NULL UNIQUE,
///     first_name VARCHAR(150) NOT NULL,
///     last_name VARCHAR(150) NOT NULL,
///     password_hash VARCHAR(255) NOT NULL,
///     avatar_url VARCHAR(512),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Columns selected for every user query
const USER_COLUMNS: &str = "id, email, username, first_name, last_name, password_hash, \
                            avatar_url, created_at, updated_at";

/// User account
///
/// Passwords are stored as Argon2id hashes, never in plaintext.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user id (UUID v4)
    pub id: Uuid,

    /// Email address (case-insensitive via CITEXT), unique
    pub email: String,

    /// Public handle, unique
    pub username: String,

    /// Given name
    pub first_name: String,

    /// Family name
    pub last_name: String,

    /// Argon2id password hash
    pub password_hash: String,

    /// Avatar URL, None until the user uploads one
    pub avatar_url: Option<String>,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Email address
    pub email: String,

    /// Public handle
    pub username: String,

    /// Given name
    pub first_name: String,

    /// Family name
    pub last_name: String,

    /// Argon2id password hash (NOT the plaintext password)
    pub password_hash: String,
}

impl User {
    /// Creates a new user
    ///
    /// # Errors
    ///
    /// Returns a unique-constraint violation if the email or username is
    /// already taken.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let sql = format!(
            "INSERT INTO users (email, username, first_name, last_name, password_hash)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {USER_COLUMNS}"
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(data.email)
            .bind(data.username)
            .bind(data.first_name)
            .bind(data.last_name)
            .bind(data.password_hash)
            .fetch_one(pool)
            .await
    }

    /// Finds a user by id
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds a user by email (case-insensitive via CITEXT)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");

        sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Fetches a batch of users by id, in no particular order
    pub async fn find_by_ids(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Self>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)");

        sqlx::query_as::<_, User>(&sql)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Lists users ordered by registration date
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users
             ORDER BY created_at, id
             LIMIT $1 OFFSET $2"
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Total number of registered users
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await
    }

    /// Sets the avatar URL in a single statement
    ///
    /// Returns false if the user does not exist.
    pub async fn set_avatar(pool: &PgPool, id: Uuid, url: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET avatar_url = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(url)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Clears the avatar in a single atomic statement
    ///
    /// The WHERE clause doubles as the precondition check, so "had an
    /// avatar" and "avatar cleared" cannot diverge under concurrency.
    /// Returns the previous URL, or None when no avatar was set.
    pub async fn clear_avatar(pool: &PgPool, id: Uuid) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar(
            "UPDATE users SET avatar_url = NULL, updated_at = NOW()
             FROM (SELECT id, avatar_url FROM users WHERE id = $1 FOR UPDATE) prev
             WHERE users.id = prev.id AND prev.avatar_url IS NOT NULL
             RETURNING prev.avatar_url",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }
}
