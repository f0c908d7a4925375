mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use common::{percentage_promo, TestApp};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;
use storefront_api::tracing::REQUEST_ID_HEADER;

fn decimal(value: &serde_json::Value) -> Decimal {
    value
        .as_str()
        .map(|s| s.parse::<Decimal>().unwrap())
        .unwrap_or_else(|| panic!("expected decimal string, got {}", value))
}

#[tokio::test]
async fn add_and_remove_cart_items() {
    let app = TestApp::new().await;
    let user = app.create_user("Andi", "Jakarta").await;
    let rice = app.create_product("Nasi Goreng", dec!(25000)).await;

    let (status, body) = app
        .request_json(
            Method::POST,
            "/api/v1/cart/add",
            Some(json!({"userId": user.id, "productId": rice.id, "quantity": 2})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "success"}));
    assert_eq!(app.cart_items().await[0].quantity, 2);

    let (status, body) = app
        .request_json(
            Method::POST,
            "/api/v1/cart/remove",
            Some(json!({"userId": user.id, "productId": rice.id})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "success");
    assert!(app.cart_items().await.is_empty());

    let (status, body) = app
        .request_json(
            Method::POST,
            "/api/v1/cart/remove",
            Some(json!({"userId": user.id, "productId": rice.id})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "item not found");
}

#[tokio::test]
async fn invalid_bodies_are_bad_requests() {
    let app = TestApp::new().await;

    let (status, body) = app
        .request_json(
            Method::POST,
            "/api/v1/cart/add",
            Some(json!({"userId": 1, "productId": 1, "quantity": 0})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "validation error");
    assert!(body["data"].as_str().is_some_and(|s| s.contains("quantity")));

    let (status, body) = app
        .request_json(
            Method::POST,
            "/api/v1/cart/add",
            Some(json!({"userId": "one"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().is_some_and(|s| !s.is_empty()));
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn unknown_product_is_not_found() {
    let app = TestApp::new().await;
    let user = app.create_user("Andi", "Jakarta").await;

    let (status, body) = app
        .request_json(
            Method::POST,
            "/api/v1/cart/add",
            Some(json!({"userId": user.id, "productId": 404, "quantity": 1})),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"message": "product not found"}));
}

#[tokio::test]
async fn promo_lifecycle_and_checkout() {
    let app = TestApp::new().await;
    let user = app.create_user("Budi", "Bandung").await;
    let rice = app.create_product("Nasi Goreng", dec!(25000)).await;
    let now = Utc::now();

    let (status, body) = app
        .request_json(
            Method::POST,
            "/api/v1/promos",
            Some(json!({
                "name": "Bandung 15%",
                "segmentation": "CITY",
                "type": "PERCENTAGE_DISCOUNT",
                "startDate": (now - Duration::days(1)).to_rfc3339(),
                "endDate": (now + Duration::days(30)).to_rfc3339(),
                "minOrderAmount": 50000,
                "discountValue": 15,
                "maxDiscountAmount": 10000,
                "maxUsageLimit": 10,
                "cities": ["Jakarta", "Bandung"]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["message"], "promo created");
    let promo_id = body["data"]["promoId"].as_i64().unwrap();

    let (status, body) = app
        .request_json(
            Method::GET,
            &format!("/api/v1/promos?userId={}", user.id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "promo list");
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["meta"]["total"], 0);

    for _ in 0..4 {
        app.request_json(
            Method::POST,
            "/api/v1/cart/add",
            Some(json!({"userId": user.id, "productId": rice.id, "quantity": 1})),
        )
        .await;
    }

    let (status, body) = app
        .request_json(
            Method::GET,
            &format!("/api/v1/promos?userId={}&page=1&perPage=5", user.id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["id"], promo_id);
    assert_eq!(body["data"][0]["type"], "PERCENTAGE_DISCOUNT");
    assert_eq!(
        body["meta"],
        json!({"page": 1, "perPage": 5, "total": 1, "totalPage": 1})
    );

    let (status, body) = app
        .request_json(
            Method::POST,
            "/api/v1/orders",
            Some(json!({"userId": user.id, "promoIds": [promo_id]})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["message"], "order created");
    assert_eq!(decimal(&body["data"]["totalAmount"]), dec!(90000));
    assert_eq!(body["data"]["promos"][0]["promoId"], promo_id);
    assert_eq!(
        decimal(&body["data"]["promos"][0]["discountAmount"]),
        dec!(10000)
    );
    assert_eq!(body["data"]["items"][0]["quantity"], 4);

    let (status, body) = app
        .request_json(
            Method::POST,
            "/api/v1/orders",
            Some(json!({"userId": user.id})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "cart not found");
}

#[tokio::test]
async fn create_promo_validation_reports_detail() {
    let app = TestApp::new().await;
    let now = Utc::now();

    let (status, body) = app
        .request_json(
            Method::POST,
            "/api/v1/promos",
            Some(json!({
                "name": "Too generous",
                "segmentation": "ALL",
                "type": "PERCENTAGE_DISCOUNT",
                "startDate": now.to_rfc3339(),
                "endDate": (now + Duration::days(1)).to_rfc3339(),
                "discountValue": 150
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "validation error");
    assert!(body["data"].as_str().is_some());

    let (status, _) = app
        .request_json(
            Method::POST,
            "/api/v1/promos",
            Some(json!({
                "name": "Unknown segment",
                "segmentation": "VIP",
                "type": "PERCENTAGE_DISCOUNT",
                "startDate": now.to_rfc3339(),
                "endDate": (now + Duration::days(1)).to_rfc3339(),
                "discountValue": 10
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn extend_promo_endpoint() {
    let app = TestApp::new().await;
    let promo = app
        .insert_promo(percentage_promo(dec!(10), Decimal::ZERO, None))
        .await;
    let new_end = promo.end_date + Duration::days(10);

    let (status, body) = app
        .request_json(
            Method::POST,
            &format!("/api/v1/promos/{}/extend", promo.id),
            Some(json!({"endDate": new_end.to_rfc3339()})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "promo extended"}));

    let (status, body) = app
        .request_json(
            Method::POST,
            &format!("/api/v1/promos/{}/extend", promo.id),
            Some(json!({"endDate": promo.end_date.to_rfc3339()})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "new end date must be greater than current end date"
    );

    let (status, body) = app
        .request_json(
            Method::POST,
            "/api/v1/promos/9999/extend",
            Some(json!({"endDate": new_end.to_rfc3339()})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "promo not found");

    let (status, _) = app
        .request_json(
            Method::POST,
            "/api/v1/promos/abc/extend",
            Some(json!({"endDate": new_end.to_rfc3339()})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_promos_requires_a_user() {
    let app = TestApp::new().await;

    let (status, _) = app.request_json(Method::GET, "/api/v1/promos", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .request_json(Method::GET, "/api/v1/promos?userId=0", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "validation error");
}

#[tokio::test]
async fn responses_carry_request_id_and_docs_are_served() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::GET, "/api-docs/openapi.json", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
}

#[tokio::test]
async fn page_far_past_the_end_is_empty() {
    let app = TestApp::new().await;
    let user = app.create_user("Citra", "Surabaya").await;
    let tea = app.create_product("Es Teh Manis", dec!(5000)).await;
    app.add_to_cart(user.id, tea.id, 1).await;
    app.insert_promo(percentage_promo(dec!(10), Decimal::ZERO, Some(dec!(1000))))
        .await;

    let (status, body) = app
        .request_json(
            Method::GET,
            &format!(
                "/api/v1/promos?userId={}&page=9223372036854775807&perPage=100",
                user.id
            ),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["meta"]["page"], json!(9_223_372_036_854_775_807u64));
}
