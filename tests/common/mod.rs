#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Duration, Utc};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde_json::Value;
use storefront_api::{
    app_router,
    config::AppConfig,
    db,
    entities::{cart, cart_item, product, promo, promo_city, user, PromoType, Segmentation},
    services::AddToCartInput,
    AppState,
};
use std::sync::Arc;
use tower::ServiceExt;

/// Helper harness for spinning up an application state backed by an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    pub async fn with_config(tweak: impl FnOnce(&mut AppConfig)) -> Self {
        let mut cfg = AppConfig::new("sqlite::memory:", "test");
        // One connection so every query sees the same in-memory database.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        tweak(&mut cfg);

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(Arc::new(pool), cfg);
        let router = app_router(state.clone());

        Self { router, state }
    }

    pub fn db(&self) -> &db::DbPool {
        self.state.db.as_ref()
    }

    /// Send a request against the router.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Sends a request and decodes the JSON envelope.
    pub async fn request_json(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let response = self.request(method, uri, body).await;
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("failed to read response body")
            .to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, value)
    }

    pub async fn create_user(&self, name: &str, city: &str) -> user::Model {
        self.create_user_with(name, city, false, Utc::now() - Duration::days(365))
            .await
    }

    pub async fn create_user_with(
        &self,
        name: &str,
        city: &str,
        is_loyal: bool,
        created_at: DateTime<Utc>,
    ) -> user::Model {
        user::ActiveModel {
            name: Set(name.to_string()),
            email: Set(format!("{}@example.com", name.to_lowercase())),
            city: Set(city.to_string()),
            is_loyal: Set(is_loyal),
            created_at: Set(created_at),
            updated_at: Set(created_at),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("seed user for tests")
    }

    pub async fn create_product(&self, name: &str, price: Decimal) -> product::Model {
        let now = Utc::now();
        product::ActiveModel {
            name: Set(name.to_string()),
            price: Set(price),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("seed product for tests")
    }

    pub async fn add_to_cart(&self, user_id: i32, product_id: i32, quantity: i32) {
        self.state
            .services
            .cart
            .add_to_cart(AddToCartInput {
                user_id,
                product_id,
                quantity,
            })
            .await
            .expect("add to cart in tests");
    }

    pub async fn insert_promo(&self, model: promo::Model) -> promo::Model {
        let mut active = promo::ActiveModel::from(model).reset_all();
        active.id = sea_orm::ActiveValue::NotSet;
        active.insert(self.db()).await.expect("seed promo for tests")
    }

    pub async fn insert_city_promo(&self, model: promo::Model, cities: &[&str]) -> promo::Model {
        let saved = self.insert_promo(model).await;
        for city in cities {
            promo_city::ActiveModel {
                promo_id: Set(saved.id),
                city: Set(city.to_string()),
                created_at: Set(saved.created_at),
                updated_at: Set(saved.created_at),
                ..Default::default()
            }
            .insert(self.db())
            .await
            .expect("seed promo city for tests");
        }
        saved
    }

    pub async fn reload_promo(&self, id: i32) -> promo::Model {
        promo::Entity::find_by_id(id)
            .one(self.db())
            .await
            .expect("load promo")
            .expect("promo exists")
    }

    pub async fn reload_user(&self, id: i32) -> user::Model {
        user::Entity::find_by_id(id)
            .one(self.db())
            .await
            .expect("load user")
            .expect("user exists")
    }

    pub async fn cart_items(&self) -> Vec<cart_item::Model> {
        cart_item::Entity::find()
            .all(self.db())
            .await
            .expect("load cart items")
    }

    pub async fn carts(&self) -> Vec<cart::Model> {
        cart::Entity::find().all(self.db()).await.expect("load carts")
    }
}

/// Percentage promo open to everyone, active for the next month.
pub fn percentage_promo(
    discount_value: Decimal,
    min_order_amount: Decimal,
    max_discount_amount: Option<Decimal>,
) -> promo::Model {
    let now = Utc::now();
    promo::Model {
        id: 0,
        name: format!("{}% off", discount_value),
        description: None,
        segmentation: Segmentation::All,
        promo_type: PromoType::PercentageDiscount,
        min_order_amount,
        discount_value,
        max_discount_amount,
        buy_product_id: None,
        buy_product_qty: 0,
        free_product_id: None,
        free_product_qty: 0,
        start_date: now - Duration::days(1),
        end_date: now + Duration::days(30),
        max_usage_limit: Some(100),
        current_usage_count: 0,
        created_at: now,
        updated_at: now,
    }
}

/// Buy-x-get-y promo open to everyone, active for the next month.
pub fn buy_x_get_y_promo(
    buy_product_id: i32,
    buy_product_qty: i32,
    free_product_id: i32,
    free_product_qty: i32,
) -> promo::Model {
    promo::Model {
        name: "Buy one get one".to_string(),
        promo_type: PromoType::BuyXGetYFree,
        discount_value: Decimal::ZERO,
        buy_product_id: Some(buy_product_id),
        buy_product_qty,
        free_product_id: Some(free_product_id),
        free_product_qty,
        ..percentage_promo(Decimal::ZERO, Decimal::ZERO, None)
    }
}
