use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storefront API",
        version = "0.1.0",
        description = r#"
# Storefront API

Carts, promotions and checkout for a small e-commerce store.

## Promotions

- **PERCENTAGE_DISCOUNT**: a percent off the running order total, optionally capped
- **BUY_X_GET_Y_FREE**: a free product once enough of another product is in the cart

A promo is offered to everyone (`ALL`), to loyal users, to users registered
within the last month, or to users in a list of cities.

## Responses

Every response is a JSON envelope:

```json
{ "message": "promo list", "data": [], "meta": { "page": 1, "perPage": 10, "total": 0, "totalPage": 0 } }
```

Errors carry `message` and, for validation failures, `data` with the field detail.
        "#
    ),
    servers((url = "http://localhost:8080", description = "Local development")),
    tags(
        (name = "cart", description = "Cart mutation"),
        (name = "orders", description = "Checkout"),
        (name = "promos", description = "Promo lifecycle and listing")
    ),
    paths(
        crate::handlers::carts::add_to_cart,
        crate::handlers::carts::remove_from_cart,
        crate::handlers::orders::create_order,
        crate::handlers::promos::create_promo,
        crate::handlers::promos::extend_promo,
        crate::handlers::promos::get_promos,
    ),
    components(
        schemas(
            crate::handlers::common::PaginationMeta,
            crate::handlers::carts::AddCartRequest,
            crate::handlers::carts::RemoveCartRequest,
            crate::handlers::orders::CreateOrderRequest,
            crate::handlers::orders::OrderView,
            crate::handlers::orders::OrderItemView,
            crate::handlers::orders::OrderPromoView,
            crate::handlers::promos::CreatePromoRequest,
            crate::handlers::promos::ExtendPromoRequest,
            crate::handlers::promos::PromoView,
            crate::handlers::promos::PromoIdView,
            crate::entities::Segmentation,
            crate::entities::PromoType,
            crate::errors::ErrorBody
        )
    )
)]
pub struct ApiDocV1;

/// Serves the generated document at `/api-docs/openapi.json`.
pub fn docs_routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route(
        "/api-docs/openapi.json",
        get(|| async { Json(ApiDocV1::openapi()) }),
    )
}
