//! `GET /pvz` filtering and pagination.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use pvz_integration_tests::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_listing_nests_receptions_and_products() {
    let app = TestApp::new();
    let pvz_id = app.create_pickup_point("Москва").await;
    let employee = app.dummy_token("employee").await;
    app.post("/receptions", Some(&employee), Some(json!({ "pvzId": pvz_id })))
        .await;
    app.post(
        "/products",
        Some(&employee),
        Some(json!({ "type": "обувь", "pvzId": pvz_id })),
    )
    .await;

    let response = app.get("/pvz", Some(&employee)).await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.text);

    let entries = response.body.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["pvz"]["id"], pvz_id.as_str());
    assert_eq!(entries[0]["pvz"]["city"], "Москва");
    assert!(entries[0]["pvz"]["registrationDate"].is_string());

    let receptions = entries[0]["receptions"].as_array().unwrap();
    assert_eq!(receptions.len(), 1);
    assert_eq!(receptions[0]["reception"]["status"], "in_progress");
    assert_eq!(receptions[0]["products"][0]["type"], "обувь");
}

#[tokio::test]
async fn test_listing_pagination() {
    let app = TestApp::new();
    for _ in 0..3 {
        app.create_pickup_point("Казань").await;
    }
    let employee = app.dummy_token("employee").await;

    let first = app.get("/pvz?page=1&limit=2", Some(&employee)).await;
    let second = app.get("/pvz?page=2&limit=2", Some(&employee)).await;
    let third = app.get("/pvz?page=3&limit=2", Some(&employee)).await;

    assert_eq!(first.body.as_array().unwrap().len(), 2);
    assert_eq!(second.body.as_array().unwrap().len(), 1);
    assert!(third.body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_listing_filters_outside_window() {
    let app = TestApp::new();
    let pvz_id = app.create_pickup_point("Москва").await;
    let employee = app.dummy_token("employee").await;
    app.post("/receptions", Some(&employee), Some(json!({ "pvzId": pvz_id })))
        .await;

    let past = app
        .get(
            "/pvz?startDate=2000-01-01T00:00:00Z&endDate=2000-01-02T00:00:00Z",
            Some(&employee),
        )
        .await;
    assert_eq!(past.status, StatusCode::OK);
    assert!(past.body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_listing_rejects_bad_query() {
    let app = TestApp::new();
    let employee = app.dummy_token("employee").await;

    let cases = [
        ("/pvz?startDate=yesterday", "invalid start date format"),
        ("/pvz?endDate=2025-02-30", "invalid end date format"),
        ("/pvz?page=0", "invalid page"),
        ("/pvz?limit=31", "invalid page size"),
        ("/pvz?limit=0", "invalid page size"),
        ("/pvz?page=abc", "invalid query parameters"),
    ];

    for (uri, message) in cases {
        let response = app.get(uri, Some(&employee)).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(response.body["message"], message, "{uri}");
    }
}
