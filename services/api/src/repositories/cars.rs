//! Car repository for PostgreSQL

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};
use tracing::info;

use super::{
    CarDeletion, CarRepository, DUPLICATE_VIN, Merge, RepositoryError, RepositoryResult,
    missing_reference,
};
use crate::{
    models::{Car, CarDraft, Condition},
    pagination::PageWindow,
    validation::FieldErrors,
};

const CAR_COLUMNS: &str = "id, make, model, year, vin, mileage, price, features, condition, \
                           image, owner_id, created_at, updated_at";

/// Car repository backed by PostgreSQL
#[derive(Clone)]
pub struct PgCarRepository {
    pool: PgPool,
}

impl PgCarRepository {
    /// Create a new car repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn car_from_row(row: &PgRow) -> Result<Car, sqlx::Error> {
    let condition: String = row.try_get("condition")?;
    let condition = condition
        .parse::<Condition>()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

    Ok(Car {
        id: row.try_get("id")?,
        make: row.try_get("make")?,
        model: row.try_get("model")?,
        year: row.try_get("year")?,
        vin: row.try_get("vin")?,
        mileage: row.try_get("mileage")?,
        price: row.try_get("price")?,
        features: row.try_get("features")?,
        condition,
        image: row.try_get("image")?,
        owner: row.try_get("owner_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Unique vin and an existing listing user; the user row is share-locked
/// until the transaction ends.
async fn check_constraints(
    tx: &mut Transaction<'_, Postgres>,
    draft: &CarDraft,
    id: Option<i64>,
) -> RepositoryResult<()> {
    let mut errors = FieldErrors::new();

    let duplicate: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM cars WHERE vin = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
    )
    .bind(&draft.vin)
    .bind(id)
    .fetch_one(&mut **tx)
    .await?;
    if duplicate {
        errors.add("vin", DUPLICATE_VIN);
    }

    if let Some(owner) = draft.owner {
        let user: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE id = $1 FOR SHARE")
            .bind(owner)
            .fetch_optional(&mut **tx)
            .await?;
        if user.is_none() {
            errors.merge(missing_reference("owner", owner));
        }
    }

    errors.into_result().map_err(RepositoryError::from)
}

async fn lock_car(tx: &mut Transaction<'_, Postgres>, id: i64) -> RepositoryResult<Car> {
    let row = sqlx::query(&format!(
        "SELECT {CAR_COLUMNS} FROM cars WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;

    match row {
        Some(row) => Ok(car_from_row(&row)?),
        None => Err(RepositoryError::not_found("Car", id)),
    }
}

#[async_trait]
impl CarRepository for PgCarRepository {
    async fn list(&self, window: PageWindow) -> RepositoryResult<(Vec<Car>, i64)> {
        let rows = sqlx::query(&format!(
            "SELECT {CAR_COLUMNS} FROM cars ORDER BY id LIMIT $1 OFFSET $2"
        ))
        .bind(window.limit)
        .bind(window.offset)
        .fetch_all(&self.pool)
        .await?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cars")
            .fetch_one(&self.pool)
            .await?;

        let cars = rows
            .iter()
            .map(car_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((cars, count))
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Car>> {
        let row = sqlx::query(&format!("SELECT {CAR_COLUMNS} FROM cars WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(car_from_row).transpose()?)
    }

    async fn create(&self, draft: &CarDraft) -> RepositoryResult<Car> {
        let mut tx = self.pool.begin().await?;
        check_constraints(&mut tx, draft, None).await?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO cars (make, model, year, vin, mileage, price, features, condition, image, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {CAR_COLUMNS}
            "#
        ))
        .bind(&draft.make)
        .bind(&draft.model)
        .bind(draft.year)
        .bind(&draft.vin)
        .bind(draft.mileage)
        .bind(draft.price)
        .bind(&draft.features)
        .bind(draft.condition.as_str())
        .bind(&draft.image)
        .bind(draft.owner)
        .fetch_one(&mut *tx)
        .await?;

        let car = car_from_row(&row)?;
        tx.commit().await?;

        info!("Created car {} (vin {})", car.id, car.vin);
        Ok(car)
    }

    async fn update(&self, id: i64, merge: Merge<'_, Car, CarDraft>) -> RepositoryResult<Car> {
        let mut tx = self.pool.begin().await?;
        let current = lock_car(&mut tx, id).await?;
        let draft = merge(&current)?;
        check_constraints(&mut tx, &draft, Some(id)).await?;

        let row = sqlx::query(&format!(
            r#"
            UPDATE cars
            SET make = $1, model = $2, year = $3, vin = $4, mileage = $5, price = $6,
                features = $7, condition = $8, image = $9, owner_id = $10, updated_at = NOW()
            WHERE id = $11
            RETURNING {CAR_COLUMNS}
            "#
        ))
        .bind(&draft.make)
        .bind(&draft.model)
        .bind(draft.year)
        .bind(&draft.vin)
        .bind(draft.mileage)
        .bind(draft.price)
        .bind(&draft.features)
        .bind(draft.condition.as_str())
        .bind(&draft.image)
        .bind(draft.owner)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        let car = car_from_row(&row)?;
        tx.commit().await?;

        info!("Updated car {}", car.id);
        Ok(car)
    }

    async fn delete(&self, id: i64) -> RepositoryResult<CarDeletion> {
        let mut tx = self.pool.begin().await?;
        lock_car(&mut tx, id).await?;

        let sales_deleted = sqlx::query("DELETE FROM sales WHERE car_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM cars WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!("Deleted car {} and {} sale(s)", id, sales_deleted);
        Ok(CarDeletion { sales_deleted })
    }
}
