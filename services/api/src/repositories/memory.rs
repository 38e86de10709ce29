//! In-memory store for tests/dev
//!
//! All four tables live behind one lock, so every write (including cascades)
//! is a single critical section and readers never see a half-applied change.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::{
    collections::BTreeMap,
    sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};
use tracing::info;

use super::{
    CarDeletion, CarRepository, DUPLICATE_USERNAME, DUPLICATE_VIN, Merge, OwnerDeletion,
    OwnerRepository, RepositoryError, RepositoryResult, SaleRepository, UserDeletion,
    UserRepository, missing_reference,
};
use crate::{
    models::{Car, CarDraft, Owner, OwnerDraft, Sale, SaleDraft, User, UserDraft},
    pagination::PageWindow,
    validation::FieldErrors,
};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    owners: BTreeMap<i64, Owner>,
    cars: BTreeMap<i64, Car>,
    sales: BTreeMap<i64, Sale>,
    last_user_id: i64,
    last_owner_id: i64,
    last_car_id: i64,
    last_sale_id: i64,
}

impl Tables {
    fn check_car(&self, draft: &CarDraft, id: Option<i64>) -> RepositoryResult<()> {
        let mut errors = FieldErrors::new();

        if self
            .cars
            .values()
            .any(|car| car.vin == draft.vin && Some(car.id) != id)
        {
            errors.add("vin", DUPLICATE_VIN);
        }

        if let Some(owner) = draft.owner {
            if !self.users.contains_key(&owner) {
                errors.merge(missing_reference("owner", owner));
            }
        }

        errors.into_result().map_err(RepositoryError::from)
    }

    fn check_sale(&self, draft: &SaleDraft) -> RepositoryResult<()> {
        let mut errors = FieldErrors::new();

        if !self.cars.contains_key(&draft.car) {
            errors.merge(missing_reference("car", draft.car));
        }
        if !self.owners.contains_key(&draft.owner) {
            errors.merge(missing_reference("owner", draft.owner));
        }

        errors.into_result().map_err(RepositoryError::from)
    }

    fn check_user(&self, draft: &UserDraft, id: Option<i64>) -> RepositoryResult<()> {
        if self
            .users
            .values()
            .any(|user| user.username == draft.username && Some(user.id) != id)
        {
            return Err(FieldErrors::single("username", DUPLICATE_USERNAME).into());
        }

        Ok(())
    }
}

/// Store holding every table in process memory
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Every write validates before mutating, so a poisoned lock still guards
    // consistent tables.
    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn page<T: Clone>(table: &BTreeMap<i64, T>, window: PageWindow) -> (Vec<T>, i64) {
    let offset = usize::try_from(window.offset).unwrap_or(usize::MAX);
    let limit = usize::try_from(window.limit).unwrap_or(0);
    let count = i64::try_from(table.len()).unwrap_or(i64::MAX);

    (
        table.values().skip(offset).take(limit).cloned().collect(),
        count,
    )
}

/// Next `updated_at`, strictly after the previous one
fn touch(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

#[async_trait]
impl CarRepository for InMemoryStore {
    async fn list(&self, window: PageWindow) -> RepositoryResult<(Vec<Car>, i64)> {
        Ok(page(&self.read().cars, window))
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Car>> {
        Ok(self.read().cars.get(&id).cloned())
    }

    async fn create(&self, draft: &CarDraft) -> RepositoryResult<Car> {
        let mut tables = self.write();
        tables.check_car(draft, None)?;

        tables.last_car_id += 1;
        let now = Utc::now();
        let car = draft.clone().into_car(tables.last_car_id, now, now);
        tables.cars.insert(car.id, car.clone());

        info!("Created car {} (vin {})", car.id, car.vin);
        Ok(car)
    }

    async fn update(&self, id: i64, merge: Merge<'_, Car, CarDraft>) -> RepositoryResult<Car> {
        let mut tables = self.write();
        let current = tables
            .cars
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("Car", id))?;
        let draft = merge(&current)?;
        tables.check_car(&draft, Some(id))?;

        let car = draft.into_car(id, current.created_at, touch(current.updated_at));
        tables.cars.insert(id, car.clone());

        info!("Updated car {}", id);
        Ok(car)
    }

    async fn delete(&self, id: i64) -> RepositoryResult<CarDeletion> {
        let mut tables = self.write();
        if tables.cars.remove(&id).is_none() {
            return Err(RepositoryError::not_found("Car", id));
        }

        let before = tables.sales.len();
        tables.sales.retain(|_, sale| sale.car != id);
        let sales_deleted = (before - tables.sales.len()) as u64;

        info!("Deleted car {} and {} sale(s)", id, sales_deleted);
        Ok(CarDeletion { sales_deleted })
    }
}

#[async_trait]
impl OwnerRepository for InMemoryStore {
    async fn list(&self, window: PageWindow) -> RepositoryResult<(Vec<Owner>, i64)> {
        Ok(page(&self.read().owners, window))
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Owner>> {
        Ok(self.read().owners.get(&id).cloned())
    }

    async fn create(&self, draft: &OwnerDraft) -> RepositoryResult<Owner> {
        let mut tables = self.write();

        tables.last_owner_id += 1;
        let owner = draft.clone().into_owner(tables.last_owner_id);
        tables.owners.insert(owner.id, owner.clone());

        info!("Created owner {}", owner.id);
        Ok(owner)
    }

    async fn update(&self, id: i64, merge: Merge<'_, Owner, OwnerDraft>) -> RepositoryResult<Owner> {
        let mut tables = self.write();
        let current = tables
            .owners
            .get(&id)
            .ok_or_else(|| RepositoryError::not_found("Owner", id))?;

        let owner = merge(current)?.into_owner(id);
        tables.owners.insert(id, owner.clone());

        info!("Updated owner {}", id);
        Ok(owner)
    }

    async fn delete(&self, id: i64) -> RepositoryResult<OwnerDeletion> {
        let mut tables = self.write();
        if tables.owners.remove(&id).is_none() {
            return Err(RepositoryError::not_found("Owner", id));
        }

        let before = tables.sales.len();
        tables.sales.retain(|_, sale| sale.owner != id);
        let sales_deleted = (before - tables.sales.len()) as u64;

        info!("Deleted owner {} and {} sale(s)", id, sales_deleted);
        Ok(OwnerDeletion { sales_deleted })
    }
}

#[async_trait]
impl SaleRepository for InMemoryStore {
    async fn list(&self, window: PageWindow) -> RepositoryResult<(Vec<Sale>, i64)> {
        Ok(page(&self.read().sales, window))
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Sale>> {
        Ok(self.read().sales.get(&id).cloned())
    }

    async fn create(&self, draft: &SaleDraft) -> RepositoryResult<Sale> {
        let mut tables = self.write();
        tables.check_sale(draft)?;

        tables.last_sale_id += 1;
        let sale = draft.clone().into_sale(tables.last_sale_id, Utc::now());
        tables.sales.insert(sale.id, sale.clone());

        info!("Recorded sale {} of car {} to owner {}", sale.id, sale.car, sale.owner);
        Ok(sale)
    }

    async fn update(&self, id: i64, merge: Merge<'_, Sale, SaleDraft>) -> RepositoryResult<Sale> {
        let mut tables = self.write();
        let current = tables
            .sales
            .get(&id)
            .ok_or_else(|| RepositoryError::not_found("Sale", id))?;
        let sale_date = current.sale_date;
        let draft = merge(current)?;
        tables.check_sale(&draft)?;

        let sale = draft.into_sale(id, sale_date);
        tables.sales.insert(id, sale.clone());

        info!("Updated sale {}", id);
        Ok(sale)
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        if self.write().sales.remove(&id).is_none() {
            return Err(RepositoryError::not_found("Sale", id));
        }

        info!("Deleted sale {}", id);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn list(&self, window: PageWindow) -> RepositoryResult<(Vec<User>, i64)> {
        Ok(page(&self.read().users, window))
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>> {
        Ok(self.read().users.get(&id).cloned())
    }

    async fn create(&self, draft: &UserDraft) -> RepositoryResult<User> {
        let mut tables = self.write();
        tables.check_user(draft, None)?;

        tables.last_user_id += 1;
        let now = Utc::now();
        let user = draft.clone().into_user(tables.last_user_id, now, now);
        tables.users.insert(user.id, user.clone());

        info!("Created user {} ({})", user.id, user.username);
        Ok(user)
    }

    async fn update(&self, id: i64, merge: Merge<'_, User, UserDraft>) -> RepositoryResult<User> {
        let mut tables = self.write();
        let current = tables
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("User", id))?;
        let draft = merge(&current)?;
        tables.check_user(&draft, Some(id))?;

        let user = draft.into_user(id, current.created_at, touch(current.updated_at));
        tables.users.insert(id, user.clone());

        info!("Updated user {}", id);
        Ok(user)
    }

    async fn delete(&self, id: i64) -> RepositoryResult<UserDeletion> {
        let mut tables = self.write();
        if tables.users.remove(&id).is_none() {
            return Err(RepositoryError::not_found("User", id));
        }

        let mut cars_released = 0;
        for car in tables.cars.values_mut().filter(|car| car.owner == Some(id)) {
            car.owner = None;
            cars_released += 1;
        }

        info!("Deleted user {} and released {} car(s)", id, cars_released);
        Ok(UserDeletion { cars_released })
    }
}
