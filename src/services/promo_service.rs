use crate::{
    db::UnitOfWork,
    entities::{promo, PromoType, Segmentation},
    errors::ServiceError,
    repositories::{CartRepository, EligibilityQuery, ProductRepository, PromoRepository},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePromoInput {
    pub name: String,
    pub description: Option<String>,
    pub segmentation: Segmentation,
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
    pub max_usage_limit: Option<i32>,
    pub cities: Vec<String>,
}

impl CreatePromoInput {
    fn into_active_model(self, now: DateTime<Utc>) -> promo::ActiveModel {
        promo::ActiveModel {
            name: Set(self.name),
            description: Set(self.description),
            segmentation: Set(self.segmentation),
            promo_type: Set(self.promo_type),
            min_order_amount: Set(self.min_order_amount.unwrap_or_default()),
            discount_value: Set(self.discount_value.unwrap_or_default()),
            max_discount_amount: Set(self.max_discount_amount),
            buy_product_id: Set(self.buy_product_id),
            buy_product_qty: Set(self.buy_item_count.unwrap_or_default()),
            free_product_id: Set(self.free_product_id),
            free_product_qty: Set(self.free_item_count.unwrap_or_default()),
            start_date: Set(self.start_date),
            end_date: Set(self.end_date),
            max_usage_limit: Set(self.max_usage_limit),
            current_usage_count: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendPromoInput {
    pub id: i32,
    /// Replaces the start date when given
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetPromoInput {
    pub user_id: i32,
    pub page: u64,
    pub per_page: u64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PromoPage {
    pub promos: Vec<promo::Model>,
    pub total: u64,
}

/// Promo lifecycle and listing.
#[derive(Clone)]
pub struct PromoService {
    db: Arc<DatabaseConnection>,
    uow: UnitOfWork,
    promos: PromoRepository,
    products: ProductRepository,
    carts: CartRepository,
}

impl PromoService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            uow: UnitOfWork::new(db.clone()),
            db,
            promos: PromoRepository,
            products: ProductRepository,
            carts: CartRepository,
        }
    }

    /// Creates a promo and, for CITY segmentation, its city rows. Returns the new id.
    ///
    /// # Errors
    ///
    /// * `ServiceError::NotFound` - a buy-x-get-y product reference does not exist
    /// * `ServiceError::BadRequest` - no usage limit, a percentage promo without
    ///   a discount cap, a buy-x-get-y promo without product ids, or a CITY promo
    ///   without cities
    #[instrument(skip(self))]
    pub async fn create_promo(&self, input: CreatePromoInput) -> Result<i32, ServiceError> {
        if input.max_usage_limit.is_none() {
            return Err(ServiceError::BadRequest(
                "max usage limit is required".to_string(),
            ));
        }
        if input.promo_type == PromoType::PercentageDiscount
            && input.max_discount_amount.is_none()
        {
            return Err(ServiceError::BadRequest(
                "max discount amount is required for PERCENTAGE_DISCOUNT promos".to_string(),
            ));
        }
        if input.segmentation == Segmentation::City && input.cities.is_empty() {
            return Err(ServiceError::BadRequest(
                "cities are required for CITY promos".to_string(),
            ));
        }

        let promos = self.promos;
        let products = self.products;

        let promo_id = self
            .uow
            .execute(move |txn| {
                Box::pin(async move {
                    if input.promo_type == PromoType::BuyXGetYFree {
                        let (Some(buy_id), Some(free_id)) =
                            (input.buy_product_id, input.free_product_id)
                        else {
                            return Err(ServiceError::BadRequest(
                                "buy and free product ids are required".to_string(),
                            ));
                        };
                        products
                            .find_by_id(txn, buy_id)
                            .await?
                            .ok_or_else(|| ServiceError::not_found("buy product"))?;
                        products
                            .find_by_id(txn, free_id)
                            .await?
                            .ok_or_else(|| ServiceError::not_found("free product"))?;
                    }

                    let segmentation = input.segmentation;
                    let cities = input.cities.clone();
                    let saved = promos
                        .insert(txn, input.into_active_model(Utc::now()))
                        .await?;

                    if segmentation == Segmentation::City {
                        promos.insert_cities(txn, saved.id, &cities).await?;
                    }

                    Ok(saved.id)
                })
            })
            .await?;

        info!(promo_id, "Promo created");
        Ok(promo_id)
    }

    /// Moves the promo's end date later, optionally replacing its start date.
    ///
    /// # Errors
    ///
    /// * `ServiceError::NotFound` - no promo with this id
    /// * `ServiceError::BadRequest` - the new end date is not after both the
    ///   current end date and now
    #[instrument(skip(self))]
    pub async fn extend_promo(&self, input: ExtendPromoInput) -> Result<promo::Model, ServiceError> {
        let promos = self.promos;

        let updated = self
            .uow
            .execute(move |txn| {
                Box::pin(async move {
                    let mut promo = promos
                        .find_by_id(txn, input.id)
                        .await?
                        .ok_or_else(|| ServiceError::not_found("promo"))?;

                    if input.end_date <= promo.end_date {
                        return Err(ServiceError::BadRequest(
                            "new end date must be greater than current end date".to_string(),
                        ));
                    }
                    if input.end_date <= Utc::now() {
                        return Err(ServiceError::BadRequest(
                            "new end date must be in the future".to_string(),
                        ));
                    }

                    promo.end_date = input.end_date;
                    if let Some(start_date) = input.start_date {
                        promo.start_date = start_date;
                    }

                    Ok(promos.save(txn, promo).await?)
                })
            })
            .await?;

        info!(promo_id = updated.id, end_date = %updated.end_date, "Promo extended");
        Ok(updated)
    }

    /// Lists promos the user can apply to their current cart right now.
    ///
    /// A missing or empty cart yields an empty page.
    #[instrument(skip(self))]
    pub async fn get_promos(&self, input: GetPromoInput) -> Result<PromoPage, ServiceError> {
        let db = self.db.as_ref();

        let Some(cart) = self.carts.find_by_user_id(db, input.user_id).await? else {
            debug!(user_id = input.user_id, "No cart; no promos available");
            return Ok(PromoPage::default());
        };
        if self.carts.count_items(db, cart.id).await? == 0 {
            debug!(user_id = input.user_id, "Empty cart; no promos available");
            return Ok(PromoPage::default());
        }

        let query = EligibilityQuery::for_user(input.user_id).available();
        let (promos, total) = self
            .promos
            .find_eligible_page(db, &query, input.page, input.per_page)
            .await?;

        Ok(PromoPage { promos, total })
    }
}
