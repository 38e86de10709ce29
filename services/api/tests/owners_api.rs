mod support;

use axum::http::StatusCode;
use serde_json::{Value, json};

use support::{app, create, get, owner_body, patch, post, put};

#[tokio::test]
async fn contact_info_must_be_an_email() {
    let app = app();
    let mut body = owner_body("Luca Ferrari");
    body["contact_info"] = json!("call me maybe");

    let (status, body) = post(&app, "/api/owners/", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"]["contact_info"][0], "Enter a valid email address.");
}

#[tokio::test]
async fn address_is_optional() {
    let app = app();

    let (status, owner) = post(
        &app,
        "/api/owners/",
        json!({ "name": "Luca Ferrari", "contact_info": "luca@example.it" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(owner["address"], "");
}

#[tokio::test]
async fn owners_may_share_a_name() {
    let app = app();
    create(&app, "/api/owners/", owner_body("Luca Ferrari")).await;
    create(&app, "/api/owners/", owner_body("Luca Ferrari")).await;

    let (_, list) = get(&app, "/api/owners/").await;
    assert_eq!(list["count"], 2);
}

#[tokio::test]
async fn page_past_the_end_is_empty() {
    let app = app();
    for n in 0..3 {
        create(&app, "/api/owners/", owner_body(&format!("Owner {n}"))).await;
    }

    let (status, body) = get(&app, "/api/owners/?page=5&page_size=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
    assert_eq!(body["results"], json!([]));
    assert_eq!(body["next"], Value::Null);
    assert_eq!(body["previous"], "/api/owners/?page=2&page_size=2");
}

#[tokio::test]
async fn put_keeps_address_when_omitted() {
    let app = app();
    let id = create(&app, "/api/owners/", owner_body("Luca Ferrari")).await;

    let (status, owner) = put(
        &app,
        &format!("/api/owners/{id}/"),
        json!({ "name": "Luca Ferrari", "contact_info": "luca@example.it" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(owner["contact_info"], "luca@example.it");
    assert_eq!(owner["address"], "Via Roma 1, Milano");
}

#[tokio::test]
async fn patch_rejects_blank_name() {
    let app = app();
    let id = create(&app, "/api/owners/", owner_body("Luca Ferrari")).await;

    let (status, body) = patch(&app, &format!("/api/owners/{id}/"), json!({ "name": "  " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"]["name"][0], "This field may not be blank.");

    let (_, owner) = get(&app, &format!("/api/owners/{id}/")).await;
    assert_eq!(owner["name"], "Luca Ferrari");
}

#[tokio::test]
async fn list_query_errors_use_the_json_body() {
    let app = app();

    let (status, body) = get(&app, "/api/owners/?page_size=5&page_size=6").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "{body}");
}

#[tokio::test]
async fn nul_in_name_is_a_field_error() {
    let app = app();
    let mut body = owner_body("Luca");
    body["name"] = json!("Luca\u{0}Ferrari");

    let (status, body) = post(&app, "/api/owners/", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"]["name"][0], "Null characters are not allowed.");
}
