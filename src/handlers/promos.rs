use crate::{
    entities::{promo, PromoType, Segmentation},
    errors::ServiceError,
    handlers::common::{positive, validate_input, PaginationMeta},
    services::{CreatePromoInput, ExtendPromoInput, GetPromoInput},
    ApiResponse, AppState,
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Json, Path, Query, State,
    },
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

/// Creates the router for promo endpoints
pub fn promos_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_promo).get(get_promos))
        .route("/:id/extend", post(extend_promo))
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_create_promo", skip_on_field_errors = false))]
pub struct CreatePromoRequest {
    #[validate(length(min = 1))]
    pub name: String,
    pub description: Option<String>,
    pub segmentation: Segmentation,
    #[serde(rename = "type")]
    pub promo_type: PromoType,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub min_order_amount: Option<Decimal>,
    pub discount_value: Option<Decimal>,
    pub max_discount_amount: Option<Decimal>,
    pub buy_product_id: Option<i32>,
    pub buy_item_count: Option<i32>,
    pub free_product_id: Option<i32>,
    pub free_item_count: Option<i32>,
    #[validate(range(min = 1))]
    pub max_usage_limit: Option<i32>,
    /// Required for CITY segmentation, ignored otherwise
    #[serde(default)]
    pub cities: Vec<String>,
}

fn rule_violation(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

fn at_least_one<T: PartialOrd + From<u8>>(value: Option<T>) -> bool {
    value.map_or(false, |v| v >= T::from(1))
}

fn validate_create_promo(request: &CreatePromoRequest) -> Result<(), ValidationError> {
    if request.end_date < request.start_date {
        return Err(rule_violation(
            "end_date_before_start_date",
            "endDate must not be before startDate",
        ));
    }

    if request.max_usage_limit.is_none() {
        return Err(rule_violation(
            "max_usage_limit_required",
            "maxUsageLimit is required",
        ));
    }

    match request.promo_type {
        PromoType::BuyXGetYFree => {
            if !at_least_one(request.buy_product_id) || !at_least_one(request.free_product_id) {
                return Err(rule_violation(
                    "product_ids_required",
                    "buyProductId and freeProductId are required",
                ));
            }
            if !at_least_one(request.buy_item_count) || !at_least_one(request.free_item_count) {
                return Err(rule_violation(
                    "item_counts_required",
                    "buyItemCount and freeItemCount must be at least 1",
                ));
            }
        }
        PromoType::PercentageDiscount => {
            let in_range = request
                .discount_value
                .map_or(false, |v| v >= Decimal::ONE && v <= Decimal::ONE_HUNDRED);
            if !in_range {
                return Err(rule_violation(
                    "discount_value_out_of_range",
                    "discountValue must be between 1 and 100",
                ));
            }
            if !at_least_one(request.max_discount_amount) {
                return Err(rule_violation(
                    "max_discount_amount_required",
                    "maxDiscountAmount is required and must be at least 1",
                ));
            }
            if request.min_order_amount.is_some() && !at_least_one(request.min_order_amount) {
                return Err(rule_violation(
                    "min_order_amount_not_positive",
                    "minOrderAmount must be at least 1",
                ));
            }
        }
    }

    if request.segmentation == Segmentation::City
        && (request.cities.is_empty() || request.cities.iter().any(|c| c.trim().is_empty()))
    {
        return Err(rule_violation(
            "cities_required",
            "cities must list at least one non-blank city",
        ));
    }

    Ok(())
}

impl From<CreatePromoRequest> for CreatePromoInput {
    fn from(request: CreatePromoRequest) -> Self {
        Self {
            name: request.name,
            description: request.description,
            segmentation: request.segmentation,
            promo_type: request.promo_type,
            start_date: request.start_date,
            end_date: request.end_date,
            min_order_amount: request.min_order_amount,
            discount_value: request.discount_value,
            max_discount_amount: request.max_discount_amount,
            buy_product_id: request.buy_product_id,
            buy_item_count: request.buy_item_count,
            free_product_id: request.free_product_id,
            free_item_count: request.free_item_count,
            max_usage_limit: request.max_usage_limit,
            cities: request
                .cities
                .into_iter()
                .map(|city| city.trim().to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_extend_promo"))]
pub struct ExtendPromoRequest {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: DateTime<Utc>,
}

fn validate_extend_promo(request: &ExtendPromoRequest) -> Result<(), ValidationError> {
    match request.start_date {
        Some(start) if request.end_date < start => Err(rule_violation(
            "end_date_before_start_date",
            "endDate must not be before startDate",
        )),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct GetPromoParams {
    /// User whose cart the promos are matched against
    #[validate(range(min = 1))]
    pub user_id: i32,
    /// Page number, default 1
    pub page: Option<i64>,
    /// Page size, default 10
    pub per_page: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PromoIdView {
    pub promo_id: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PromoView {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub segmentation: Segmentation,
    #[serde(rename = "type")]
    pub promo_type: PromoType,
    pub min_order_amount: Decimal,
    pub discount_value: Decimal,
    pub max_discount_amount: Option<Decimal>,
    pub buy_product_id: Option<i32>,
    pub buy_product_qty: i32,
    pub free_product_id: Option<i32>,
    pub free_product_qty: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub max_usage_limit: Option<i32>,
    pub current_usage_count: i32,
}

impl From<promo::Model> for PromoView {
    fn from(promo: promo::Model) -> Self {
        Self {
            id: promo.id,
            name: promo.name,
            description: promo.description,
            segmentation: promo.segmentation,
            promo_type: promo.promo_type,
            min_order_amount: promo.min_order_amount,
            discount_value: promo.discount_value,
            max_discount_amount: promo.max_discount_amount,
            buy_product_id: promo.buy_product_id,
            buy_product_qty: promo.buy_product_qty,
            free_product_id: promo.free_product_id,
            free_product_qty: promo.free_product_qty,
            start_date: promo.start_date,
            end_date: promo.end_date,
            max_usage_limit: promo.max_usage_limit,
            current_usage_count: promo.current_usage_count,
        }
    }
}

/// Create a promo
#[utoipa::path(
    post,
    path = "/api/v1/promos",
    tag = "promos",
    request_body = CreatePromoRequest,
    responses(
        (status = 200, description = "Promo created", body = ApiResponse<PromoIdView>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorBody),
        (status = 404, description = "Referenced product not found", body = crate::errors::ErrorBody),
    )
)]
pub async fn create_promo(
    State(state): State<AppState>,
    payload: Result<Json<CreatePromoRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let Json(payload) = payload?;
    validate_input(&payload)?;

    let promo_id = state.services.promos.create_promo(payload.into()).await?;

    Ok(ApiResponse::with_data("promo created", PromoIdView { promo_id }))
}

/// Push a promo's end date later
#[utoipa::path(
    post,
    path = "/api/v1/promos/{id}/extend",
    tag = "promos",
    params(("id" = i32, Path, description = "Promo id")),
    request_body = ExtendPromoRequest,
    responses(
        (status = 200, description = "Promo extended"),
        (status = 400, description = "Invalid dates", body = crate::errors::ErrorBody),
        (status = 404, description = "Promo not found", body = crate::errors::ErrorBody),
    )
)]
pub async fn extend_promo(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<ExtendPromoRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    validate_input(&payload)?;

    state
        .services
        .promos
        .extend_promo(ExtendPromoInput {
            id,
            start_date: payload.start_date,
            end_date: payload.end_date,
        })
        .await?;

    Ok(ApiResponse::<()>::message("promo extended"))
}

/// List promos the user can currently apply to their cart
#[utoipa::path(
    get,
    path = "/api/v1/promos",
    tag = "promos",
    params(GetPromoParams),
    responses(
        (status = 200, description = "Applicable promos", body = ApiResponse<Vec<PromoView>>),
        (status = 400, description = "Invalid query", body = crate::errors::ErrorBody),
    )
)]
pub async fn get_promos(
    State(state): State<AppState>,
    params: Result<Query<GetPromoParams>, QueryRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let Query(params) = params?;
    validate_input(&params)?;

    let (page, per_page) = state
        .config
        .page_window(positive(params.page), positive(params.per_page));

    let result = state
        .services
        .promos
        .get_promos(GetPromoInput {
            user_id: params.user_id,
            page,
            per_page,
        })
        .await?;

    let promos: Vec<PromoView> = result.promos.into_iter().map(PromoView::from).collect();
    Ok(ApiResponse::paginated(
        "promo list",
        promos,
        PaginationMeta::new(page, per_page, result.total),
    ))
}
