use crate::{
    entities::{order_item, order_promo},
    errors::ServiceError,
    handlers::common::validate_input,
    repositories::PlacedOrder,
    services::CreateOrderInput,
    ApiResponse, AppState,
};
use axum::{
    extract::{rejection::JsonRejection, Json, State},
    response::IntoResponse,
    routing::post,
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Creates the router for order endpoints
pub fn orders_routes() -> Router<AppState> {
    Router::new().route("/", post(create_order))
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[validate(range(min = 1))]
    pub user_id: i32,
    /// Promos to apply; every id must be positive
    #[serde(default)]
    #[validate(custom = "validate_promo_ids")]
    pub promo_ids: Vec<i32>,
}

fn validate_promo_ids(ids: &[i32]) -> Result<(), ValidationError> {
    if ids.iter().any(|id| *id < 1) {
        return Err(ValidationError::new("promo_id_not_positive"));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemView {
    pub product_id: i32,
    pub price: Decimal,
    pub quantity: i32,
    pub total_amount: Decimal,
}

impl From<order_item::Model> for OrderItemView {
    fn from(item: order_item::Model) -> Self {
        Self {
            product_id: item.product_id,
            price: item.price,
            quantity: item.quantity,
            total_amount: item.total_amount,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderPromoView {
    pub promo_id: i32,
    pub discount_amount: Decimal,
    pub free_product_id: Option<i32>,
    pub free_product_qty: i32,
}

impl From<order_promo::Model> for OrderPromoView {
    fn from(promo: order_promo::Model) -> Self {
        Self {
            promo_id: promo.promo_id,
            discount_amount: promo.discount_amount,
            free_product_id: promo.free_product_id,
            free_product_qty: promo.free_product_qty,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub order_id: i32,
    pub user_id: i32,
    pub total_amount: Decimal,
    pub items: Vec<OrderItemView>,
    pub promos: Vec<OrderPromoView>,
    pub created_at: DateTime<Utc>,
}

impl From<PlacedOrder> for OrderView {
    fn from(placed: PlacedOrder) -> Self {
        Self {
            order_id: placed.order.id,
            user_id: placed.order.user_id,
            total_amount: placed.order.total_amount,
            items: placed.items.into_iter().map(OrderItemView::from).collect(),
            promos: placed.promos.into_iter().map(OrderPromoView::from).collect(),
            created_at: placed.order.created_at,
        }
    }
}

/// Check out the user's cart
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    tag = "orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Order created", body = ApiResponse<OrderView>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorBody),
        (status = 404, description = "Cart empty or no requested promo applies", body = crate::errors::ErrorBody),
    )
)]
pub async fn create_order(
    State(state): State<AppState>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let Json(payload) = payload?;
    validate_input(&payload)?;

    let placed = state
        .services
        .orders
        .create_order(CreateOrderInput {
            user_id: payload.user_id,
            promo_ids: payload.promo_ids,
        })
        .await?;

    Ok(ApiResponse::with_data("order created", OrderView::from(placed)))
}
