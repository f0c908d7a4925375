use crate::{
    errors::ServiceError,
    handlers::common::validate_input,
    services::{AddToCartInput, RemoveFromCartInput},
    ApiResponse, AppState,
};
use axum::{
    extract::{rejection::JsonRejection, Json, State},
    response::IntoResponse,
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Creates the router for cart endpoints
pub fn carts_routes() -> Router<AppState> {
    Router::new()
        .route("/add", post(add_to_cart))
        .route("/remove", post(remove_from_cart))
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddCartRequest {
    #[validate(range(min = 1))]
    pub user_id: i32,
    #[validate(range(min = 1))]
    pub product_id: i32,
    #[validate(range(min = 1))]
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RemoveCartRequest {
    #[validate(range(min = 1))]
    pub user_id: i32,
    #[validate(range(min = 1))]
    pub product_id: i32,
}

/// Add a product to the user's cart
#[utoipa::path(
    post,
    path = "/api/v1/cart/add",
    tag = "cart",
    request_body = AddCartRequest,
    responses(
        (status = 200, description = "Product added; quantities merge for a product already in the cart"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorBody),
        (status = 404, description = "Product not found", body = crate::errors::ErrorBody),
    )
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    payload: Result<Json<AddCartRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let Json(payload) = payload?;
    validate_input(&payload)?;

    state
        .services
        .cart
        .add_to_cart(AddToCartInput {
            user_id: payload.user_id,
            product_id: payload.product_id,
            quantity: payload.quantity,
        })
        .await?;

    Ok(ApiResponse::<()>::message("success"))
}

/// Remove a product from the user's cart
#[utoipa::path(
    post,
    path = "/api/v1/cart/remove",
    tag = "cart",
    request_body = RemoveCartRequest,
    responses(
        (status = 200, description = "Item removed"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorBody),
        (status = 404, description = "Item not found", body = crate::errors::ErrorBody),
    )
)]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    payload: Result<Json<RemoveCartRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let Json(payload) = payload?;
    validate_input(&payload)?;

    state
        .services
        .cart
        .remove_from_cart(RemoveFromCartInput {
            user_id: payload.user_id,
            product_id: payload.product_id,
        })
        .await?;

    Ok(ApiResponse::<()>::message("success"))
}
