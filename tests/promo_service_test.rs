mod common;

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use common::{buy_x_get_y_promo, percentage_promo, TestApp};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{EntityTrait, PaginatorTrait};
use storefront_api::{
    entities::{promo, PromoType, Segmentation},
    errors::ServiceError,
    repositories::PromoRepository,
    services::{CreatePromoInput, ExtendPromoInput, GetPromoInput},
};

fn create_input(promo_type: PromoType, segmentation: Segmentation) -> CreatePromoInput {
    let now = Utc::now();
    CreatePromoInput {
        name: "Launch promo".to_string(),
        description: Some("Opening week".to_string()),
        segmentation,
        promo_type,
        start_date: now,
        end_date: now + Duration::days(7),
        min_order_amount: Some(dec!(30000)),
        discount_value: Some(dec!(10)),
        max_discount_amount: Some(dec!(5000)),
        buy_product_id: None,
        buy_item_count: None,
        free_product_id: None,
        free_item_count: None,
        max_usage_limit: Some(50),
        cities: vec![],
    }
}

async fn promo_count(app: &TestApp) -> u64 {
    promo::Entity::find().count(app.db()).await.unwrap()
}

#[tokio::test]
async fn create_percentage_promo_starts_unused() {
    let app = TestApp::new().await;

    let id = app
        .state
        .services
        .promos
        .create_promo(create_input(PromoType::PercentageDiscount, Segmentation::All))
        .await
        .unwrap();

    let saved = app.reload_promo(id).await;
    assert_eq!(saved.name, "Launch promo");
    assert_eq!(saved.current_usage_count, 0);
    assert_eq!(saved.max_usage_limit, Some(50));
    assert_eq!(saved.discount_value, dec!(10));
}

#[tokio::test]
async fn create_city_promo_stores_its_cities() {
    let app = TestApp::new().await;
    let mut input = create_input(PromoType::PercentageDiscount, Segmentation::City);
    input.cities = vec!["Jakarta".to_string(), "Bandung".to_string()];

    let id = app.state.services.promos.create_promo(input).await.unwrap();

    let cities: Vec<String> = PromoRepository
        .find_cities(app.db(), id)
        .await
        .unwrap()
        .into_iter()
        .map(|row| row.city)
        .collect();
    assert_eq!(cities, vec!["Jakarta".to_string(), "Bandung".to_string()]);
}

#[tokio::test]
async fn city_promo_without_cities_is_rejected() {
    let app = TestApp::new().await;

    let result = app
        .state
        .services
        .promos
        .create_promo(create_input(PromoType::PercentageDiscount, Segmentation::City))
        .await;

    assert_matches!(result, Err(ServiceError::BadRequest(_)));
    assert_eq!(promo_count(&app).await, 0);
}

#[tokio::test]
async fn buy_x_get_y_with_unknown_buy_product_creates_nothing() {
    let app = TestApp::new().await;
    let tea = app.create_product("Es Teh Manis", dec!(5000)).await;

    let mut input = create_input(PromoType::BuyXGetYFree, Segmentation::All);
    input.buy_product_id = Some(999);
    input.buy_item_count = Some(1);
    input.free_product_id = Some(tea.id);
    input.free_item_count = Some(1);

    let result = app.state.services.promos.create_promo(input).await;

    assert_matches!(result, Err(ServiceError::NotFound(msg)) if msg == "buy product not found");
    assert_eq!(promo_count(&app).await, 0);
}

#[tokio::test]
async fn buy_x_get_y_with_unknown_free_product_is_not_found() {
    let app = TestApp::new().await;
    let rice = app.create_product("Nasi Goreng", dec!(25000)).await;

    let mut input = create_input(PromoType::BuyXGetYFree, Segmentation::All);
    input.buy_product_id = Some(rice.id);
    input.buy_item_count = Some(1);
    input.free_product_id = Some(999);
    input.free_item_count = Some(1);

    let result = app.state.services.promos.create_promo(input).await;
    assert_matches!(result, Err(ServiceError::NotFound(msg)) if msg == "free product not found");
}

#[tokio::test]
async fn extend_moves_end_date_and_optionally_start() {
    let app = TestApp::new().await;
    let promo = app
        .insert_promo(percentage_promo(dec!(10), Decimal::ZERO, None))
        .await;
    let new_start = promo.start_date - Duration::days(3);
    let new_end = promo.end_date + Duration::days(30);

    let updated = app
        .state
        .services
        .promos
        .extend_promo(ExtendPromoInput {
            id: promo.id,
            start_date: Some(new_start),
            end_date: new_end,
        })
        .await
        .unwrap();

    assert_eq!(updated.end_date, new_end);
    assert_eq!(updated.start_date, new_start);
    assert_eq!(app.reload_promo(promo.id).await.end_date, new_end);
}

#[tokio::test]
async fn extend_to_earlier_end_date_is_rejected() {
    let app = TestApp::new().await;
    let promo = app
        .insert_promo(percentage_promo(dec!(10), Decimal::ZERO, None))
        .await;

    let result = app
        .state
        .services
        .promos
        .extend_promo(ExtendPromoInput {
            id: promo.id,
            start_date: None,
            end_date: promo.end_date - Duration::days(1),
        })
        .await;

    assert_matches!(result, Err(ServiceError::BadRequest(_)));
    assert_eq!(app.reload_promo(promo.id).await.end_date, promo.end_date);
}

#[tokio::test]
async fn extend_into_the_past_is_rejected() {
    let app = TestApp::new().await;
    let now = Utc::now();
    let promo = app
        .insert_promo(promo::Model {
            start_date: now - Duration::days(30),
            end_date: now - Duration::days(10),
            ..percentage_promo(dec!(10), Decimal::ZERO, None)
        })
        .await;

    let result = app
        .state
        .services
        .promos
        .extend_promo(ExtendPromoInput {
            id: promo.id,
            start_date: None,
            end_date: now - Duration::days(5),
        })
        .await;

    assert_matches!(
        result,
        Err(ServiceError::BadRequest(msg)) if msg == "new end date must be in the future"
    );
}

#[tokio::test]
async fn extend_unknown_promo_is_not_found() {
    let app = TestApp::new().await;

    let result = app
        .state
        .services
        .promos
        .extend_promo(ExtendPromoInput {
            id: 77,
            start_date: None,
            end_date: Utc::now() + Duration::days(1),
        })
        .await;

    assert_matches!(result, Err(ServiceError::NotFound(msg)) if msg == "promo not found");
}

#[tokio::test]
async fn listing_with_empty_cart_is_empty() {
    let app = TestApp::new().await;
    let user = app.create_user("Andi", "Jakarta").await;
    app.insert_promo(percentage_promo(dec!(10), Decimal::ZERO, None))
        .await;

    let page = app
        .state
        .services
        .promos
        .get_promos(GetPromoInput {
            user_id: user.id,
            page: 1,
            per_page: 10,
        })
        .await
        .unwrap();

    assert!(page.promos.is_empty());
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn listing_matches_cart_and_profile() {
    let app = TestApp::new().await;
    let user = app.create_user("Andi", "Bandung").await;
    let rice = app.create_product("Nasi Goreng", dec!(25000)).await;
    app.add_to_cart(user.id, rice.id, 4).await;

    let open = app
        .insert_promo(percentage_promo(dec!(10), dec!(100000), None))
        .await;
    let too_expensive = app
        .insert_promo(percentage_promo(dec!(10), dec!(100001), None))
        .await;
    let city = app
        .insert_city_promo(
            promo::Model {
                segmentation: Segmentation::City,
                ..percentage_promo(dec!(15), dec!(50000), Some(dec!(10000)))
            },
            &["JAKARTA", "bandung"],
        )
        .await;
    let other_city = app
        .insert_city_promo(
            promo::Model {
                segmentation: Segmentation::City,
                ..percentage_promo(dec!(15), Decimal::ZERO, None)
            },
            &["Surabaya"],
        )
        .await;
    let exhausted = app
        .insert_promo(promo::Model {
            max_usage_limit: Some(3),
            current_usage_count: 3,
            ..percentage_promo(dec!(5), Decimal::ZERO, None)
        })
        .await;
    let unlimited = app
        .insert_promo(promo::Model {
            max_usage_limit: None,
            current_usage_count: 1000,
            ..percentage_promo(dec!(5), Decimal::ZERO, None)
        })
        .await;

    let page = app
        .state
        .services
        .promos
        .get_promos(GetPromoInput {
            user_id: user.id,
            page: 1,
            per_page: 10,
        })
        .await
        .unwrap();

    let ids: Vec<i32> = page.promos.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![open.id, city.id, unlimited.id]);
    assert_eq!(page.total, 3);
    assert!(!ids.contains(&too_expensive.id));
    assert!(!ids.contains(&other_city.id));
    assert!(!ids.contains(&exhausted.id));
}

#[tokio::test]
async fn listing_is_paginated() {
    let app = TestApp::new().await;
    let user = app.create_user("Citra", "Surabaya").await;
    let tea = app.create_product("Es Teh Manis", dec!(5000)).await;
    app.add_to_cart(user.id, tea.id, 1).await;

    let mut ids = Vec::new();
    for value in [5, 10, 15, 20, 25] {
        let promo = app
            .insert_promo(percentage_promo(Decimal::from(value), Decimal::ZERO, None))
            .await;
        ids.push(promo.id);
    }

    let page = app
        .state
        .services
        .promos
        .get_promos(GetPromoInput {
            user_id: user.id,
            page: 2,
            per_page: 2,
        })
        .await
        .unwrap();

    assert_eq!(page.total, 5);
    let page_ids: Vec<i32> = page.promos.iter().map(|p| p.id).collect();
    assert_eq!(page_ids, ids[2..4].to_vec());

    let beyond = app
        .state
        .services
        .promos
        .get_promos(GetPromoInput {
            user_id: user.id,
            page: 4,
            per_page: 2,
        })
        .await
        .unwrap();
    assert!(beyond.promos.is_empty());
    assert_eq!(beyond.total, 5);
}

#[tokio::test]
async fn buy_x_get_y_row_without_buy_product_is_never_listed() {
    let app = TestApp::new().await;
    let user = app.create_user("Andi", "Jakarta").await;
    let rice = app.create_product("Nasi Goreng", dec!(25000)).await;
    let tea = app.create_product("Es Teh Manis", dec!(5000)).await;
    app.add_to_cart(user.id, rice.id, 1).await;

    let dangling = app
        .insert_promo(promo::Model {
            buy_product_id: None,
            buy_product_qty: 0,
            ..buy_x_get_y_promo(rice.id, 1, tea.id, 1)
        })
        .await;
    let complete = app.insert_promo(buy_x_get_y_promo(rice.id, 1, tea.id, 1)).await;

    let page = app
        .state
        .services
        .promos
        .get_promos(GetPromoInput {
            user_id: user.id,
            page: 1,
            per_page: 10,
        })
        .await
        .unwrap();

    let ids: Vec<i32> = page.promos.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![complete.id]);
    assert!(!ids.contains(&dangling.id));
}

#[tokio::test]
async fn usage_limit_and_percentage_cap_are_required() {
    let app = TestApp::new().await;
    let promos = app.state.services.promos.clone();

    let mut unlimited = create_input(PromoType::PercentageDiscount, Segmentation::All);
    unlimited.max_usage_limit = None;
    assert_matches!(
        promos.create_promo(unlimited).await,
        Err(ServiceError::BadRequest(msg)) if msg == "max usage limit is required"
    );

    let mut uncapped = create_input(PromoType::PercentageDiscount, Segmentation::All);
    uncapped.max_discount_amount = None;
    assert_matches!(
        promos.create_promo(uncapped).await,
        Err(ServiceError::BadRequest(_))
    );

    assert_eq!(promo_count(&app).await, 0);
}
