//! Sale repository for PostgreSQL

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};
use tracing::info;

use super::{Merge, RepositoryError, RepositoryResult, SaleRepository, missing_reference};
use crate::{
    models::{Sale, SaleDraft},
    pagination::PageWindow,
    validation::FieldErrors,
};

/// Sale repository backed by PostgreSQL
#[derive(Clone)]
pub struct PgSaleRepository {
    pool: PgPool,
}

impl PgSaleRepository {
    /// Create a new sale repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn sale_from_row(row: &PgRow) -> Result<Sale, sqlx::Error> {
    Ok(Sale {
        id: row.try_get("id")?,
        car: row.try_get("car_id")?,
        owner: row.try_get("owner_id")?,
        sale_price: row.try_get("sale_price")?,
        sale_date: row.try_get("sale_date")?,
    })
}

/// The referenced car and owner must exist; both rows are share-locked so
/// they cannot be deleted before the sale is written.
async fn check_references(
    tx: &mut Transaction<'_, Postgres>,
    draft: &SaleDraft,
) -> RepositoryResult<()> {
    let mut errors = FieldErrors::new();

    let car: Option<i64> = sqlx::query_scalar("SELECT id FROM cars WHERE id = $1 FOR SHARE")
        .bind(draft.car)
        .fetch_optional(&mut **tx)
        .await?;
    if car.is_none() {
        errors.merge(missing_reference("car", draft.car));
    }

    let owner: Option<i64> = sqlx::query_scalar("SELECT id FROM owners WHERE id = $1 FOR SHARE")
        .bind(draft.owner)
        .fetch_optional(&mut **tx)
        .await?;
    if owner.is_none() {
        errors.merge(missing_reference("owner", draft.owner));
    }

    errors.into_result().map_err(RepositoryError::from)
}

#[async_trait]
impl SaleRepository for PgSaleRepository {
    async fn list(&self, window: PageWindow) -> RepositoryResult<(Vec<Sale>, i64)> {
        let rows = sqlx::query(
            r#"
            SELECT id, car_id, owner_id, sale_price, sale_date
            FROM sales
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(window.limit)
        .bind(window.offset)
        .fetch_all(&self.pool)
        .await?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        let sales = rows
            .iter()
            .map(sale_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((sales, count))
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Sale>> {
        let row = sqlx::query(
            "SELECT id, car_id, owner_id, sale_price, sale_date FROM sales WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(sale_from_row).transpose()?)
    }

    async fn create(&self, draft: &SaleDraft) -> RepositoryResult<Sale> {
        let mut tx = self.pool.begin().await?;
        check_references(&mut tx, draft).await?;

        let row = sqlx::query(
            r#"
            INSERT INTO sales (car_id, owner_id, sale_price)
            VALUES ($1, $2, $3)
            RETURNING id, car_id, owner_id, sale_price, sale_date
            "#,
        )
        .bind(draft.car)
        .bind(draft.owner)
        .bind(draft.sale_price)
        .fetch_one(&mut *tx)
        .await?;

        let sale = sale_from_row(&row)?;
        tx.commit().await?;

        info!("Recorded sale {} of car {} to owner {}", sale.id, sale.car, sale.owner);
        Ok(sale)
    }

    async fn update(&self, id: i64, merge: Merge<'_, Sale, SaleDraft>) -> RepositoryResult<Sale> {
        let mut tx = self.pool.begin().await?;

        let locked = sqlx::query(
            "SELECT id, car_id, owner_id, sale_price, sale_date FROM sales WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let current = match locked {
            Some(row) => sale_from_row(&row)?,
            None => return Err(RepositoryError::not_found("Sale", id)),
        };

        let draft = merge(&current)?;
        check_references(&mut tx, &draft).await?;

        let row = sqlx::query(
            r#"
            UPDATE sales
            SET car_id = $1, owner_id = $2, sale_price = $3
            WHERE id = $4
            RETURNING id, car_id, owner_id, sale_price, sale_date
            "#,
        )
        .bind(draft.car)
        .bind(draft.owner)
        .bind(draft.sale_price)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        let sale = sale_from_row(&row)?;
        tx.commit().await?;

        info!("Updated sale {}", sale.id);
        Ok(sale)
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        let deleted = sqlx::query("DELETE FROM sales WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(RepositoryError::not_found("Sale", id));
        }

        info!("Deleted sale {}", id);
        Ok(())
    }
}
