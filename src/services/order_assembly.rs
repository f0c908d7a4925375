//! Checkout pricing.
//!
//! Turns cart lines and the promos being applied into order items, promo
//! grants and a final total. Nothing here touches the database; the order
//! service persists the result.

use rust_decimal::Decimal;

use crate::entities::{promo, PromoRule};
use crate::errors::ServiceError;
use crate::repositories::{NewOrder, NewOrderItem, NewOrderPromo};

/// One cart item priced at the product's current price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartLine {
    pub cart_item_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl CartLine {
    pub fn total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Effect of one applied promo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromoGrant {
    Discount { amount: Decimal },
    FreeItem { product_id: i32, quantity: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedPromo {
    pub promo_id: i32,
    pub grant: PromoGrant,
}

impl From<AppliedPromo> for NewOrderPromo {
    fn from(applied: AppliedPromo) -> Self {
        match applied.grant {
            PromoGrant::Discount { amount } => NewOrderPromo {
                promo_id: applied.promo_id,
                discount_amount: amount,
                free_product_id: None,
                free_product_qty: 0,
            },
            PromoGrant::FreeItem {
                product_id,
                quantity,
            } => NewOrderPromo {
                promo_id: applied.promo_id,
                discount_amount: Decimal::ZERO,
                free_product_id: Some(product_id),
                free_product_qty: quantity,
            },
        }
    }
}

/// Priced order, ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledOrder {
    pub items: Vec<NewOrderItem>,
    /// Sum of item totals before any discount
    pub subtotal: Decimal,
    pub total: Decimal,
    pub applied: Vec<AppliedPromo>,
    /// The applied promos with their usage counters already incremented
    pub used_promos: Vec<promo::Model>,
    pub consumed_cart_item_ids: Vec<i32>,
}

impl AssembledOrder {
    pub fn to_new_order(&self, user_id: i32) -> NewOrder {
        NewOrder {
            user_id,
            total_amount: self.total,
            items: self.items.clone(),
            promos: self.applied.iter().copied().map(NewOrderPromo::from).collect(),
        }
    }
}

/// `running_total * percent / 100`, capped at `cap` when one is set.
pub fn percentage_discount(running_total: Decimal, percent: Decimal, cap: Option<Decimal>) -> Decimal {
    let discount = running_total * percent / Decimal::ONE_HUNDRED;
    match cap {
        Some(cap) => discount.min(cap),
        None => discount,
    }
}

/// Prices `lines` and applies `promos` in the given order.
///
/// Each percentage discount is computed against the total left by the
/// promos before it. Buy-x-get-y promos record a free item and leave the
/// total unchanged.
pub fn assemble_order(
    lines: &[CartLine],
    promos: Vec<promo::Model>,
) -> Result<AssembledOrder, ServiceError> {
    let items: Vec<NewOrderItem> = lines
        .iter()
        .map(|line| NewOrderItem {
            product_id: line.product_id,
            price: line.unit_price,
            quantity: line.quantity,
            total_amount: line.total(),
        })
        .collect();

    let subtotal: Decimal = items.iter().map(|item| item.total_amount).sum();
    let mut total = subtotal;
    let mut applied = Vec::with_capacity(promos.len());
    let mut used_promos = Vec::with_capacity(promos.len());

    for mut promo in promos {
        let rule = promo.rule().ok_or_else(|| {
            ServiceError::InternalError(format!(
                "promo {} is missing its buy or free product",
                promo.id
            ))
        })?;

        let grant = match rule {
            PromoRule::PercentageDiscount {
                discount_value,
                max_discount_amount,
                ..
            } => {
                let amount = percentage_discount(total, discount_value, max_discount_amount);
                total -= amount;
                PromoGrant::Discount { amount }
            }
            PromoRule::BuyXGetYFree {
                free_product_id,
                free_product_qty,
                ..
            } => PromoGrant::FreeItem {
                product_id: free_product_id,
                quantity: free_product_qty,
            },
        };

        promo.current_usage_count = promo.current_usage_count.checked_add(1).ok_or_else(|| {
            ServiceError::InternalError(format!("promo {} usage counter overflow", promo.id))
        })?;

        applied.push(AppliedPromo {
            promo_id: promo.id,
            grant,
        });
        used_promos.push(promo);
    }

    Ok(AssembledOrder {
        items,
        subtotal,
        total,
        applied,
        used_promos,
        consumed_cart_item_ids: lines.iter().map(|line| line.cart_item_id).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{PromoType, Segmentation};
    use assert_matches::assert_matches;
    use chrono::{Duration, Utc};
    use rust_decimal_macros::dec;

    fn line(id: i32, product_id: i32, quantity: i32, price: Decimal) -> CartLine {
        CartLine {
            cart_item_id: id,
            product_id,
            quantity,
            unit_price: price,
        }
    }

    fn percentage(id: i32, value: Decimal, cap: Option<Decimal>) -> promo::Model {
        let now = Utc::now();
        promo::Model {
            id,
            name: format!("{}% off", value),
            description: None,
            segmentation: Segmentation::All,
            promo_type: PromoType::PercentageDiscount,
            min_order_amount: Decimal::ZERO,
            discount_value: value,
            max_discount_amount: cap,
            buy_product_id: None,
            buy_product_qty: 0,
            free_product_id: None,
            free_product_qty: 0,
            start_date: now - Duration::days(1),
            end_date: now + Duration::days(30),
            max_usage_limit: Some(100),
            current_usage_count: 4,
            created_at: now,
            updated_at: now,
        }
    }

    fn buy_x_get_y(id: i32, free_product_id: Option<i32>) -> promo::Model {
        promo::Model {
            promo_type: PromoType::BuyXGetYFree,
            discount_value: Decimal::ZERO,
            max_discount_amount: None,
            buy_product_id: Some(1),
            buy_product_qty: 1,
            free_product_id,
            free_product_qty: 2,
            ..percentage(id, Decimal::ZERO, None)
        }
    }

    #[test]
    fn no_promos_total_is_sum_of_lines() {
        let lines = [
            line(10, 1, 2, dec!(25000)),
            line(11, 3, 3, dec!(5000)),
        ];
        let order = assemble_order(&lines, vec![]).unwrap();

        assert_eq!(order.subtotal, dec!(65000));
        assert_eq!(order.total, dec!(65000));
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].total_amount, dec!(50000));
        assert_eq!(order.consumed_cart_item_ids, vec![10, 11]);
        assert!(order.applied.is_empty());
    }

    #[test]
    fn percentage_discount_is_capped() {
        let lines = [line(1, 1, 4, dec!(25000))];
        let order =
            assemble_order(&lines, vec![percentage(2, dec!(15), Some(dec!(10000)))]).unwrap();

        assert_eq!(order.total, dec!(90000));
        assert_eq!(
            order.applied,
            vec![AppliedPromo {
                promo_id: 2,
                grant: PromoGrant::Discount {
                    amount: dec!(10000)
                },
            }]
        );
    }

    #[test]
    fn second_discount_applies_to_reduced_total() {
        let lines = [line(1, 1, 4, dec!(25000))];
        let promos = vec![percentage(1, dec!(10), None), percentage(2, dec!(50), None)];
        let order = assemble_order(&lines, promos).unwrap();

        // 100000 -> 90000 -> 45000
        assert_eq!(order.total, dec!(45000));
        assert_matches!(
            order.applied[1].grant,
            PromoGrant::Discount { amount } if amount == dec!(45000)
        );
    }

    #[test]
    fn free_item_leaves_total_unchanged() {
        let lines = [line(1, 1, 1, dec!(25000))];
        let order = assemble_order(&lines, vec![buy_x_get_y(1, Some(2))]).unwrap();

        assert_eq!(order.total, dec!(25000));
        assert_eq!(
            order.applied[0].grant,
            PromoGrant::FreeItem {
                product_id: 2,
                quantity: 2
            }
        );
        let record = NewOrderPromo::from(order.applied[0]);
        assert_eq!(record.discount_amount, Decimal::ZERO);
        assert_eq!(record.free_product_id, Some(2));
    }

    #[test]
    fn usage_counter_is_incremented_once() {
        let lines = [line(1, 1, 1, dec!(25000))];
        let order = assemble_order(&lines, vec![percentage(1, dec!(10), None)]).unwrap();
        assert_eq!(order.used_promos[0].current_usage_count, 5);
    }

    #[test]
    fn malformed_buy_x_get_y_is_internal_error() {
        let lines = [line(1, 1, 1, dec!(25000))];
        let result = assemble_order(&lines, vec![buy_x_get_y(9, None)]);
        assert_matches!(result, Err(ServiceError::InternalError(_)));
    }

    #[test]
    fn new_order_carries_total_items_and_promos() {
        let lines = [line(1, 1, 2, dec!(35000))];
        let order = assemble_order(&lines, vec![percentage(3, dec!(20), Some(dec!(20000)))])
            .unwrap();
        let new_order = order.to_new_order(42);

        assert_eq!(new_order.user_id, 42);
        assert_eq!(new_order.total_amount, dec!(56000));
        assert_eq!(new_order.items.len(), 1);
        assert_eq!(new_order.promos[0].discount_amount, dec!(14000));
    }
}
