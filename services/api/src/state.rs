//! Application state shared across handlers

use sqlx::PgPool;
use std::sync::Arc;

use crate::{
    config::StorageBackend,
    repositories::{
        CarRepository, InMemoryStore, OwnerRepository, PgCarRepository, PgOwnerRepository,
        PgSaleRepository, PgUserRepository, SaleRepository, UserRepository,
    },
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub cars: Arc<dyn CarRepository>,
    pub owners: Arc<dyn OwnerRepository>,
    pub sales: Arc<dyn SaleRepository>,
    pub users: Arc<dyn UserRepository>,
    pub storage: StorageBackend,
    /// Set for the PostgreSQL backend; used by the health check
    pub db_pool: Option<PgPool>,
}

impl AppState {
    /// State backed by PostgreSQL repositories
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            cars: Arc::new(PgCarRepository::new(pool.clone())),
            owners: Arc::new(PgOwnerRepository::new(pool.clone())),
            sales: Arc::new(PgSaleRepository::new(pool.clone())),
            users: Arc::new(PgUserRepository::new(pool.clone())),
            storage: StorageBackend::Postgres,
            db_pool: Some(pool),
        }
    }

    /// State backed by a fresh, empty in-memory store
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());

        Self {
            cars: store.clone(),
            owners: store.clone(),
            sales: store.clone(),
            users: store,
            storage: StorageBackend::Memory,
            db_pool: None,
        }
    }
}
