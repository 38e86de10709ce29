//! Repository tests against a live PostgreSQL database.
//!
//! Run with `DATABASE_URL` pointing at a scratch database and `--ignored`.

use chrono::Utc;
use rust_decimal::Decimal;

use common::database::{DatabaseConfig, init_pool};
use veloce_api::{
    AppState,
    models::{Car, CarDraft, Condition, OwnerDraft, SaleDraft, UserDraft},
    pagination::PageWindow,
    repositories::{RepositoryError, ensure_schema},
    validation::FieldErrors,
};

async fn state() -> AppState {
    let config = DatabaseConfig::from_env().unwrap();
    let pool = init_pool(&config).await.unwrap();
    ensure_schema(&pool).await.unwrap();
    AppState::postgres(pool)
}

/// A vin no other test run has used
fn fresh_vin() -> String {
    format!("T{:016}", Utc::now().timestamp_micros() % 10_i64.pow(16))
}

fn car(vin: String, owner: Option<i64>) -> CarDraft {
    CarDraft {
        make: "Fiat".to_string(),
        model: "124 Sport Spider".to_string(),
        year: 1972,
        vin,
        mileage: 101000,
        price: Decimal::new(1890000, 2),
        features: String::new(),
        condition: Condition::Used,
        image: None,
        owner,
    }
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn car_delete_cascades_sales() {
    let state = state().await;

    let car = state.cars.create(&car(fresh_vin(), None)).await.unwrap();
    let buyer = state
        .owners
        .create(&OwnerDraft {
            name: "Paolo Neri".to_string(),
            contact_info: "paolo@example.it".to_string(),
            address: String::new(),
        })
        .await
        .unwrap();
    let sale = state
        .sales
        .create(&SaleDraft {
            car: car.id,
            owner: buyer.id,
            sale_price: Decimal::new(1800000, 2),
        })
        .await
        .unwrap();

    let outcome = state.cars.delete(car.id).await.unwrap();
    assert_eq!(outcome.sales_deleted, 1);
    assert!(state.sales.find_by_id(sale.id).await.unwrap().is_none());

    state.owners.delete(buyer.id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn duplicate_vin_and_user_nullify() {
    let state = state().await;

    let username = format!("lister{}", Utc::now().timestamp_micros());
    let user = state
        .users
        .create(&UserDraft {
            username,
            email: String::new(),
        })
        .await
        .unwrap();

    let vin = fresh_vin();
    let listed = state.cars.create(&car(vin.clone(), Some(user.id))).await.unwrap();

    match state.cars.create(&car(vin, None)).await {
        Err(RepositoryError::Validation(errors)) => assert!(errors.contains("vin")),
        other => panic!("expected a vin error, got {other:?}"),
    }

    let outcome = state.users.delete(user.id).await.unwrap();
    assert_eq!(outcome.cars_released, 1);

    let released = state.cars.find_by_id(listed.id).await.unwrap().unwrap();
    assert_eq!(released.owner, None);

    let (cars, count) = state
        .cars
        .list(PageWindow {
            offset: 0,
            limit: 1,
        })
        .await
        .unwrap();
    assert!(count >= 1);
    assert_eq!(cars.len(), 1);

    state.cars.delete(listed.id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn update_merges_onto_the_locked_row() {
    let state = state().await;
    let created = state.cars.create(&car(fresh_vin(), None)).await.unwrap();

    let raise_mileage = |current: &Car| {
        let mut draft = current.draft();
        draft.mileage = current.mileage + 500;
        Ok::<_, FieldErrors>(draft)
    };
    state.cars.update(created.id, &raise_mileage).await.unwrap();
    let updated = state.cars.update(created.id, &raise_mileage).await.unwrap();
    assert_eq!(updated.mileage, created.mileage + 1000);
    assert!(updated.updated_at > created.updated_at);

    match state.cars.update(-1, &raise_mileage).await {
        Err(RepositoryError::NotFound { entity: "Car", .. }) => {}
        other => panic!("expected not found, got {other:?}"),
    }

    state.cars.delete(created.id).await.unwrap();
}
