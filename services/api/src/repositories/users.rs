//! User account repository for PostgreSQL

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};
use tracing::info;

use super::{
    DUPLICATE_USERNAME, Merge, RepositoryError, RepositoryResult, UserDeletion, UserRepository,
};
use crate::{
    models::{User, UserDraft},
    pagination::PageWindow,
    validation::FieldErrors,
};

/// User repository backed by PostgreSQL
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

async fn check_username(
    tx: &mut Transaction<'_, Postgres>,
    username: &str,
    id: Option<i64>,
) -> RepositoryResult<()> {
    let taken: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
    )
    .bind(username)
    .bind(id)
    .fetch_one(&mut **tx)
    .await?;

    if taken {
        return Err(FieldErrors::single("username", DUPLICATE_USERNAME).into());
    }

    Ok(())
}

async fn lock_user(tx: &mut Transaction<'_, Postgres>, id: i64) -> RepositoryResult<User> {
    let row = sqlx::query(
        "SELECT id, username, email, created_at, updated_at FROM users WHERE id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;

    match row {
        Some(row) => Ok(user_from_row(&row)?),
        None => Err(RepositoryError::not_found("User", id)),
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn list(&self, window: PageWindow) -> RepositoryResult<(Vec<User>, i64)> {
        let rows = sqlx::query(
            r#"
            SELECT id, username, email, created_at, updated_at
            FROM users
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(window.limit)
        .bind(window.offset)
        .fetch_all(&self.pool)
        .await?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        let users = rows
            .iter()
            .map(user_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((users, count))
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn create(&self, draft: &UserDraft) -> RepositoryResult<User> {
        let mut tx = self.pool.begin().await?;
        check_username(&mut tx, &draft.username, None).await?;

        let row = sqlx::query(
            r#"
            INSERT INTO users (username, email)
            VALUES ($1, $2)
            RETURNING id, username, email, created_at, updated_at
            "#,
        )
        .bind(&draft.username)
        .bind(&draft.email)
        .fetch_one(&mut *tx)
        .await?;

        let user = user_from_row(&row)?;
        tx.commit().await?;

        info!("Created user {} ({})", user.id, user.username);
        Ok(user)
    }

    async fn update(&self, id: i64, merge: Merge<'_, User, UserDraft>) -> RepositoryResult<User> {
        let mut tx = self.pool.begin().await?;
        let current = lock_user(&mut tx, id).await?;
        let draft = merge(&current)?;
        check_username(&mut tx, &draft.username, Some(id)).await?;

        let row = sqlx::query(
            r#"
            UPDATE users
            SET username = $1, email = $2, updated_at = NOW()
            WHERE id = $3
            RETURNING id, username, email, created_at, updated_at
            "#,
        )
        .bind(&draft.username)
        .bind(&draft.email)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        let user = user_from_row(&row)?;
        tx.commit().await?;

        info!("Updated user {}", user.id);
        Ok(user)
    }

    async fn delete(&self, id: i64) -> RepositoryResult<UserDeletion> {
        let mut tx = self.pool.begin().await?;
        lock_user(&mut tx, id).await?;

        // Listings survive their user; updated_at is left alone.
        let cars_released = sqlx::query("UPDATE cars SET owner_id = NULL WHERE owner_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!("Deleted user {} and released {} car(s)", id, cars_released);
        Ok(UserDeletion { cars_released })
    }
}
