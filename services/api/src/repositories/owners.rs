//! Owner repository for PostgreSQL

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};
use tracing::info;

use super::{Merge, OwnerDeletion, OwnerRepository, RepositoryError, RepositoryResult};
use crate::{
    models::{Owner, OwnerDraft},
    pagination::PageWindow,
};

/// Owner repository backed by PostgreSQL
#[derive(Clone)]
pub struct PgOwnerRepository {
    pool: PgPool,
}

impl PgOwnerRepository {
    /// Create a new owner repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn owner_from_row(row: &PgRow) -> Result<Owner, sqlx::Error> {
    Ok(Owner {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        contact_info: row.try_get("contact_info")?,
        address: row.try_get("address")?,
    })
}

async fn lock_owner(tx: &mut Transaction<'_, Postgres>, id: i64) -> RepositoryResult<Owner> {
    let row = sqlx::query(
        "SELECT id, name, contact_info, address FROM owners WHERE id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;

    match row {
        Some(row) => Ok(owner_from_row(&row)?),
        None => Err(RepositoryError::not_found("Owner", id)),
    }
}

#[async_trait]
impl OwnerRepository for PgOwnerRepository {
    async fn list(&self, window: PageWindow) -> RepositoryResult<(Vec<Owner>, i64)> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, contact_info, address
            FROM owners
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(window.limit)
        .bind(window.offset)
        .fetch_all(&self.pool)
        .await?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM owners")
            .fetch_one(&self.pool)
            .await?;

        let owners = rows
            .iter()
            .map(owner_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((owners, count))
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Owner>> {
        let row = sqlx::query("SELECT id, name, contact_info, address FROM owners WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(owner_from_row).transpose()?)
    }

    async fn create(&self, draft: &OwnerDraft) -> RepositoryResult<Owner> {
        let row = sqlx::query(
            r#"
            INSERT INTO owners (name, contact_info, address)
            VALUES ($1, $2, $3)
            RETURNING id, name, contact_info, address
            "#,
        )
        .bind(&draft.name)
        .bind(&draft.contact_info)
        .bind(&draft.address)
        .fetch_one(&self.pool)
        .await?;

        let owner = owner_from_row(&row)?;
        info!("Created owner {}", owner.id);
        Ok(owner)
    }

    async fn update(&self, id: i64, merge: Merge<'_, Owner, OwnerDraft>) -> RepositoryResult<Owner> {
        let mut tx = self.pool.begin().await?;
        let current = lock_owner(&mut tx, id).await?;
        let draft = merge(&current)?;

        let row = sqlx::query(
            r#"
            UPDATE owners
            SET name = $1, contact_info = $2, address = $3
            WHERE id = $4
            RETURNING id, name, contact_info, address
            "#,
        )
        .bind(&draft.name)
        .bind(&draft.contact_info)
        .bind(&draft.address)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        let owner = owner_from_row(&row)?;
        tx.commit().await?;

        info!("Updated owner {}", owner.id);
        Ok(owner)
    }

    async fn delete(&self, id: i64) -> RepositoryResult<OwnerDeletion> {
        let mut tx = self.pool.begin().await?;
        lock_owner(&mut tx, id).await?;

        let sales_deleted = sqlx::query("DELETE FROM sales WHERE owner_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM owners WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!("Deleted owner {} and {} sale(s)", id, sales_deleted);
        Ok(OwnerDeletion { sales_deleted })
    }
}
