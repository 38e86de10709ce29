mod support;

use axum::http::StatusCode;
use serde_json::{Value, json};

use support::{app, car_body, create, create_sale, delete, get, owner_body, patch, post};

#[tokio::test]
async fn deleting_a_car_removes_its_sales() {
    let app = app();
    let car = create(&app, "/api/cars/", car_body("CASCADECAR000001")).await;
    let owner = create(&app, "/api/owners/", owner_body("Marco Rossi")).await;
    let sale = create_sale(&app, car, owner).await;

    let (status, body) = delete(&app, &format!("/api/cars/{car}/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Car deleted successfully");
    assert_eq!(body["id"], car);
    assert_eq!(body["sales_deleted"], 1);

    let (status, _) = get(&app, &format!("/api/sales/{sale}/")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(&app, &format!("/api/owners/{owner}/")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn deleting_an_owner_removes_their_sales() {
    let app = app();
    let car = create(&app, "/api/cars/", car_body("CASCADEOWNER0001")).await;
    let buyer = create(&app, "/api/owners/", owner_body("Marco Rossi")).await;
    let other = create(&app, "/api/owners/", owner_body("Sofia Conti")).await;
    create_sale(&app, car, buyer).await;
    let kept = create_sale(&app, car, other).await;

    let (status, body) = delete(&app, &format!("/api/owners/{buyer}/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sales_deleted"], 1);

    let (_, sales) = get(&app, "/api/sales/").await;
    assert_eq!(sales["count"], 1);
    assert_eq!(sales["results"][0]["id"], kept);
}

#[tokio::test]
async fn sale_for_missing_car_is_rejected_on_car() {
    let app = app();
    let owner = create(&app, "/api/owners/", owner_body("Marco Rossi")).await;

    let (status, body) = post(
        &app,
        "/api/sales/",
        json!({ "car": 404, "owner": owner, "sale_price": "1000.00" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"]["car"][0], "Invalid pk \"404\" - object does not exist.");
    assert!(body["fields"].get("owner").is_none());

    let (_, sales) = get(&app, "/api/sales/").await;
    assert_eq!(sales["count"], 0);
}

#[tokio::test]
async fn sale_records_price_and_date() {
    let app = app();
    let car = create(&app, "/api/cars/", car_body("SALEDATECAR00001")).await;
    let owner = create(&app, "/api/owners/", owner_body("Marco Rossi")).await;

    let (status, sale) = post(
        &app,
        "/api/sales/",
        json!({
            "car": car,
            "owner": owner,
            "sale_price": 39500,
            "sale_date": "1990-05-01T00:00:00Z"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(sale["sale_price"], "39500.00");
    assert_eq!(sale["car"], car);
    assert_eq!(sale["owner"], owner);
    assert_ne!(sale["sale_date"], "1990-05-01T00:00:00Z");

    let id = sale["id"].as_i64().unwrap();
    let (status, updated) = patch(&app, &format!("/api/sales/{id}/"), json!({ "sale_price": "38000" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["sale_price"], "38000.00");
    assert_eq!(updated["sale_date"], sale["sale_date"]);
}

#[tokio::test]
async fn deleting_a_sale_keeps_car_and_owner() {
    let app = app();
    let car = create(&app, "/api/cars/", car_body("SALEDELETECAR001")).await;
    let owner = create(&app, "/api/owners/", owner_body("Marco Rossi")).await;
    let sale = create_sale(&app, car, owner).await;

    let (status, body) = delete(&app, &format!("/api/sales/{sale}/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Sale deleted successfully");

    let (status, _) = delete(&app, &format!("/api/sales/{sale}/")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(&app, &format!("/api/cars/{car}/")).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = get(&app, &format!("/api/owners/{owner}/")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn empty_sales_list() {
    let app = app();

    let (status, body) = get(&app, "/api/sales/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "count": 0, "next": Value::Null, "previous": Value::Null, "results": [] })
    );
}
