//! Sample data for local exploration.
//!
//! Creates three users, three products and four promos (one of each
//! segmentation) in a single transaction. Run with `storefront-api seed`.

use chrono::{DateTime, Months, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{DatabaseTransaction, Set};
use std::sync::Arc;
use tracing::info;

use crate::{
    db::{DbPool, UnitOfWork},
    entities::{product, promo, user, PromoType, Segmentation},
    errors::ServiceError,
    repositories::{ProductRepository, PromoRepository, UserRepository},
};

const PROMO_USAGE_LIMIT: i32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedSummary {
    pub users: usize,
    pub products: usize,
    pub promos: usize,
}

/// Inserts the sample data. Fails without writing anything if any row is
/// rejected, e.g. when the data was already seeded.
pub async fn seed(db: Arc<DbPool>) -> Result<SeedSummary, ServiceError> {
    let summary = UnitOfWork::new(db)
        .execute(|txn| {
            Box::pin(async move {
                let now = Utc::now();
                let users = create_users(txn, now).await?;
                let products = create_products(txn, now).await?;
                let promos = create_promos(txn, &products, now).await?;

                Ok(SeedSummary {
                    users: users.len(),
                    products: products.len(),
                    promos,
                })
            })
        })
        .await?;

    info!(
        users = summary.users,
        products = summary.products,
        promos = summary.promos,
        "Seed data created"
    );
    Ok(summary)
}

async fn create_users(
    txn: &DatabaseTransaction,
    now: DateTime<Utc>,
) -> Result<Vec<user::Model>, ServiceError> {
    let users_data = [
        ("Andi", "andi@example.com", "Jakarta", true),
        ("Budi", "budi@example.com", "Bandung", false),
        ("Citra", "citra@example.com", "Surabaya", false),
    ];

    let mut created = Vec::with_capacity(users_data.len());
    for (name, email, city, is_loyal) in users_data {
        let model = user::ActiveModel {
            name: Set(name.to_string()),
            email: Set(email.to_string()),
            city: Set(city.to_string()),
            is_loyal: Set(is_loyal),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        created.push(UserRepository.insert(txn, model).await?);
    }
    Ok(created)
}

async fn create_products(
    txn: &DatabaseTransaction,
    now: DateTime<Utc>,
) -> Result<Vec<product::Model>, ServiceError> {
    let products_data = [
        ("Nasi Goreng", dec!(25000)),
        ("Ayam Goreng", dec!(35000)),
        ("Es Teh Manis", dec!(5000)),
    ];

    let mut created = Vec::with_capacity(products_data.len());
    for (name, price) in products_data {
        let model = product::ActiveModel {
            name: Set(name.to_string()),
            price: Set(price),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        created.push(ProductRepository.insert(txn, model).await?);
    }
    Ok(created)
}

fn percentage_promo(
    name: &str,
    segmentation: Segmentation,
    discount_value: Decimal,
    min_order_amount: Decimal,
    max_discount_amount: Decimal,
    now: DateTime<Utc>,
    end: DateTime<Utc>,
) -> promo::ActiveModel {
    promo::ActiveModel {
        name: Set(name.to_string()),
        description: Set(None),
        segmentation: Set(segmentation),
        promo_type: Set(PromoType::PercentageDiscount),
        min_order_amount: Set(min_order_amount),
        discount_value: Set(discount_value),
        max_discount_amount: Set(Some(max_discount_amount)),
        buy_product_id: Set(None),
        buy_product_qty: Set(0),
        free_product_id: Set(None),
        free_product_qty: Set(0),
        start_date: Set(now),
        end_date: Set(end),
        max_usage_limit: Set(Some(PROMO_USAGE_LIMIT)),
        current_usage_count: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
}

async fn create_promos(
    txn: &DatabaseTransaction,
    products: &[product::Model],
    now: DateTime<Utc>,
) -> Result<usize, ServiceError> {
    let (Some(buy), Some(free)) = (products.first(), products.get(1)) else {
        return Err(ServiceError::InternalError(
            "seed products missing".to_string(),
        ));
    };
    let end = now
        .checked_add_months(Months::new(1))
        .ok_or_else(|| ServiceError::InternalError("promo end date out of range".to_string()))?;

    let promos = PromoRepository;

    let buy_one_get_one = promo::ActiveModel {
        name: Set(format!("Buy {} get {} free", buy.name, free.name)),
        description: Set(Some("Free item with every purchase".to_string())),
        segmentation: Set(Segmentation::All),
        promo_type: Set(PromoType::BuyXGetYFree),
        min_order_amount: Set(Decimal::ZERO),
        discount_value: Set(Decimal::ZERO),
        max_discount_amount: Set(None),
        buy_product_id: Set(Some(buy.id)),
        buy_product_qty: Set(1),
        free_product_id: Set(Some(free.id)),
        free_product_qty: Set(1),
        start_date: Set(now),
        end_date: Set(end),
        max_usage_limit: Set(Some(PROMO_USAGE_LIMIT)),
        current_usage_count: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    promos.insert(txn, buy_one_get_one).await?;

    let city = promos
        .insert(
            txn,
            percentage_promo(
                "15% off in Jakarta and Bandung",
                Segmentation::City,
                dec!(15),
                dec!(50000),
                dec!(10000),
                now,
                end,
            ),
        )
        .await?;
    promos
        .insert_cities(txn, city.id, &["Jakarta".to_string(), "Bandung".to_string()])
        .await?;

    promos
        .insert(
            txn,
            percentage_promo(
                "10% off for loyal customers",
                Segmentation::LoyalUser,
                dec!(10),
                dec!(30000),
                dec!(5000),
                now,
                end,
            ),
        )
        .await?;

    promos
        .insert(
            txn,
            percentage_promo(
                "20% off your first month",
                Segmentation::NewUser,
                dec!(20),
                Decimal::ZERO,
                dec!(20000),
                now,
                end,
            ),
        )
        .await?;

    Ok(4)
}
