//! Shared helpers for router-level tests

#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use veloce_api::{AppState, config::Settings, routes::create_router};

/// Router over a fresh, empty in-memory store
pub fn app() -> Router {
    create_router(AppState::in_memory(), &Settings::default())
}

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };

    (status, value)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn patch(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::PATCH, uri, Some(body)).await
}

pub async fn put(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::DELETE, uri, None).await
}

pub fn car_body(vin: &str) -> Value {
    json!({
        "make": "Alfa Romeo",
        "model": "Giulia Sprint GT",
        "year": 1965,
        "vin": vin,
        "mileage": 84000,
        "price": "42500.00",
        "features": "Veloce 1600 engine, Campagnolo wheels",
        "condition": "classic"
    })
}

pub fn owner_body(name: &str) -> Value {
    json!({
        "name": name,
        "contact_info": "buyer@example.com",
        "address": "Via Roma 1, Milano"
    })
}

/// Create a record and return its id
pub async fn create(app: &Router, uri: &str, body: Value) -> i64 {
    let (status, created) = post(app, uri, body).await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    created["id"].as_i64().unwrap()
}

pub async fn create_sale(app: &Router, car: i64, owner: i64) -> i64 {
    create(
        app,
        "/api/sales/",
        json!({ "car": car, "owner": owner, "sale_price": "41000" }),
    )
    .await
}
