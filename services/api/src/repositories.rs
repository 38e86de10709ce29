//! Repositories for database operations
//!
//! Each entity has its own repository trait. Handlers only see the traits;
//! [`AppState`](crate::state::AppState) decides whether they are backed by
//! PostgreSQL or by the in-memory store.
//!
//! Every write runs atomically and enforces the integrity rules itself:
//! unique `vin`/`username`, existing referenced records, and the
//! cascade/nullify behaviour on delete.

use async_trait::async_trait;
use serde::Serialize;
use sqlx::PgPool;
use thiserror::Error;

use crate::{
    models::{Car, CarDraft, Owner, OwnerDraft, Sale, SaleDraft, User, UserDraft},
    pagination::PageWindow,
    validation::FieldErrors,
};

pub mod cars;
pub mod memory;
pub mod owners;
pub mod sales;
pub mod users;

pub use cars::PgCarRepository;
pub use memory::InMemoryStore;
pub use owners::PgOwnerRepository;
pub use sales::PgSaleRepository;
pub use users::PgUserRepository;

/// Table definitions applied at startup
pub const SCHEMA: &str = include_str!("../sql/schema.sql");

pub const DUPLICATE_VIN: &str = "car with this vin already exists.";
pub const DUPLICATE_USERNAME: &str = "A user with that username already exists.";

/// Create the tables if they do not exist yet
pub async fn ensure_schema(pool: &PgPool) -> common::error::DatabaseResult<()> {
    common::database::apply_schema(pool, SCHEMA).await
}

/// Field error for a reference to a record that does not exist
pub fn missing_reference(field: &str, id: i64) -> FieldErrors {
    FieldErrors::single(
        field,
        format!("Invalid pk \"{id}\" - object does not exist."),
    )
}

/// Errors returned by repositories
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Integrity error: {0}")]
    Integrity(String),

    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl RepositoryError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        RepositoryError::NotFound { entity, id }
    }
}

impl From<FieldErrors> for RepositoryError {
    fn from(errors: FieldErrors) -> Self {
        RepositoryError::Validation(errors)
    }
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.code().as_deref() {
                // unique_violation
                Some("23505") => match db_err.constraint() {
                    Some("cars_vin_key") => {
                        return FieldErrors::single("vin", DUPLICATE_VIN).into();
                    }
                    Some("users_username_key") => {
                        return FieldErrors::single("username", DUPLICATE_USERNAME).into();
                    }
                    _ => {}
                },
                // foreign_key_violation, check_violation
                Some("23503") | Some("23514") => {
                    return RepositoryError::Integrity(db_err.message().to_string());
                }
                _ => {}
            }
        }

        RepositoryError::Database(err)
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Builds the replacement draft from the stored record
///
/// `update` calls it on the row it has locked for writing, so concurrent
/// partial updates of one record are applied one after the other.
pub type Merge<'a, T, D> = &'a (dyn Fn(&T) -> Result<D, FieldErrors> + Send + Sync);

/// Dependents removed together with a car
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CarDeletion {
    pub sales_deleted: u64,
}

/// Dependents removed together with an owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OwnerDeletion {
    pub sales_deleted: u64,
}

/// Cars whose `owner` was cleared when their user was deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UserDeletion {
    pub cars_released: u64,
}

#[async_trait]
pub trait CarRepository: Send + Sync {
    /// Cars in id order for one page, plus the total count
    async fn list(&self, window: PageWindow) -> RepositoryResult<(Vec<Car>, i64)>;
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Car>>;
    async fn create(&self, draft: &CarDraft) -> RepositoryResult<Car>;
    async fn update(&self, id: i64, merge: Merge<'_, Car, CarDraft>) -> RepositoryResult<Car>;
    /// Delete a car and every sale of it
    async fn delete(&self, id: i64) -> RepositoryResult<CarDeletion>;
}

#[async_trait]
pub trait OwnerRepository: Send + Sync {
    async fn list(&self, window: PageWindow) -> RepositoryResult<(Vec<Owner>, i64)>;
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Owner>>;
    async fn create(&self, draft: &OwnerDraft) -> RepositoryResult<Owner>;
    async fn update(&self, id: i64, merge: Merge<'_, Owner, OwnerDraft>) -> RepositoryResult<Owner>;
    /// Delete an owner and every sale to them
    async fn delete(&self, id: i64) -> RepositoryResult<OwnerDeletion>;
}

#[async_trait]
pub trait SaleRepository: Send + Sync {
    async fn list(&self, window: PageWindow) -> RepositoryResult<(Vec<Sale>, i64)>;
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Sale>>;
    async fn create(&self, draft: &SaleDraft) -> RepositoryResult<Sale>;
    /// Change car, owner or price; `sale_date` is kept
    async fn update(&self, id: i64, merge: Merge<'_, Sale, SaleDraft>) -> RepositoryResult<Sale>;
    async fn delete(&self, id: i64) -> RepositoryResult<()>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn list(&self, window: PageWindow) -> RepositoryResult<(Vec<User>, i64)>;
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>>;
    async fn create(&self, draft: &UserDraft) -> RepositoryResult<User>;
    async fn update(&self, id: i64, merge: Merge<'_, User, UserDraft>) -> RepositoryResult<User>;
    /// Delete a user and clear `owner` on the cars they listed
    async fn delete(&self, id: i64) -> RepositoryResult<UserDeletion>;
}
