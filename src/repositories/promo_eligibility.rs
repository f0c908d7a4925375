//! Promo eligibility as a single parameterized query.
//!
//! A promo qualifies for a user when both its type condition and its
//! segmentation condition hold against the user's profile and current cart.
//! Cart aggregates are correlated subqueries, so every promo appears at most
//! once and an empty cart aggregates to zero.

use chrono::{DateTime, Months, Utc};
use sea_orm::sea_query::{Condition, Expr, Func, Query, SelectStatement, SimpleExpr};
use sea_orm::{ActiveEnum, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Select};

use crate::entities::{cart, cart_item, product, promo, promo_city, user, PromoType, Segmentation};

/// Parameters of one eligibility lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct EligibilityQuery {
    pub user_id: i32,
    /// Restrict to these promo ids
    pub promo_ids: Option<Vec<i32>>,
    /// Also require the validity window to cover `now` and usage below the cap
    pub available_only: bool,
    pub now: DateTime<Utc>,
}

impl EligibilityQuery {
    pub fn for_user(user_id: i32) -> Self {
        Self {
            user_id,
            promo_ids: None,
            available_only: false,
            now: Utc::now(),
        }
    }

    pub fn available(mut self) -> Self {
        self.available_only = true;
        self
    }

    pub fn with_ids(mut self, ids: Vec<i32>) -> Self {
        self.promo_ids = Some(ids);
        self
    }

    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Builds the promo select, ordered by id.
    pub fn select(&self) -> Select<promo::Entity> {
        let mut condition = Condition::all()
            .add(self.type_condition())
            .add(self.segmentation_condition());

        if self.available_only {
            condition = condition.add(self.availability_condition());
        }

        if let Some(ids) = &self.promo_ids {
            condition = condition.add(promo::Column::Id.is_in(ids.iter().copied()));
        }

        promo::Entity::find()
            .filter(condition)
            .order_by_asc(promo::Column::Id)
    }

    fn type_condition(&self) -> Condition {
        let percentage = Condition::all()
            .add(type_is(PromoType::PercentageDiscount))
            .add(
                Expr::expr(subquery(self.cart_subtotal()))
                    .gte(Expr::col((promo::Entity, promo::Column::MinOrderAmount))),
            );

        let buy_x_get_y = Condition::all()
            .add(type_is(PromoType::BuyXGetYFree))
            .add(promo::Column::BuyProductId.is_not_null())
            .add(
                Expr::expr(subquery(self.buy_product_quantity()))
                    .gte(Expr::col((promo::Entity, promo::Column::BuyProductQty))),
            );

        Condition::any().add(percentage).add(buy_x_get_y)
    }

    fn segmentation_condition(&self) -> Condition {
        let city_match = Query::select()
            .expr(Expr::val(1))
            .from(promo_city::Entity)
            .and_where(
                Expr::col((promo_city::Entity, promo_city::Column::PromoId))
                    .equals((promo::Entity, promo::Column::Id)),
            )
            .and_where(
                Expr::expr(Func::lower(Expr::col((
                    promo_city::Entity,
                    promo_city::Column::City,
                ))))
                .eq(Func::lower(subquery(self.user_column(user::Column::City)))),
            )
            .to_owned();

        // Subtraction only fails next to the minimum representable date.
        let new_user_cutoff = self
            .now
            .checked_sub_months(Months::new(1))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        Condition::any()
            .add(segmentation_is(Segmentation::All))
            .add(
                Condition::all()
                    .add(segmentation_is(Segmentation::City))
                    .add(Expr::exists(city_match)),
            )
            .add(
                Condition::all()
                    .add(segmentation_is(Segmentation::LoyalUser))
                    .add(Expr::expr(subquery(self.user_column(user::Column::IsLoyal))).eq(true)),
            )
            .add(
                Condition::all()
                    .add(segmentation_is(Segmentation::NewUser))
                    .add(
                        Expr::expr(subquery(self.user_column(user::Column::CreatedAt)))
                            .gt(new_user_cutoff),
                    ),
            )
    }

    fn availability_condition(&self) -> Condition {
        Condition::all()
            .add(promo::Column::StartDate.lte(self.now))
            .add(promo::Column::EndDate.gte(self.now))
            .add(
                Condition::any()
                    .add(promo::Column::MaxUsageLimit.is_null())
                    .add(
                        Expr::col((promo::Entity, promo::Column::CurrentUsageCount))
                            .lt(Expr::col((promo::Entity, promo::Column::MaxUsageLimit))),
                    ),
            )
    }

    /// `COALESCE(SUM(products.price * cart_items.quantity), 0)` over the user's cart.
    fn cart_subtotal(&self) -> SelectStatement {
        let line_total = Expr::col((product::Entity, product::Column::Price))
            .mul(Expr::col((cart_item::Entity, cart_item::Column::Quantity)));

        self.user_cart_items()
            .expr(Func::coalesce([
                SimpleExpr::from(Func::sum(line_total)),
                Expr::val(0).into(),
            ]))
            .inner_join(
                product::Entity,
                Expr::col((product::Entity, product::Column::Id))
                    .equals((cart_item::Entity, cart_item::Column::ProductId)),
            )
            .to_owned()
    }

    /// Quantity of the promo's buy product in the user's cart, zero when absent.
    fn buy_product_quantity(&self) -> SelectStatement {
        self.user_cart_items()
            .expr(Func::coalesce([
                SimpleExpr::from(Func::sum(Expr::col((
                    cart_item::Entity,
                    cart_item::Column::Quantity,
                )))),
                Expr::val(0).into(),
            ]))
            .and_where(
                Expr::col((cart_item::Entity, cart_item::Column::ProductId))
                    .equals((promo::Entity, promo::Column::BuyProductId)),
            )
            .to_owned()
    }

    fn user_cart_items(&self) -> SelectStatement {
        Query::select()
            .from(cart_item::Entity)
            .inner_join(
                cart::Entity,
                Expr::col((cart::Entity, cart::Column::Id))
                    .equals((cart_item::Entity, cart_item::Column::CartId)),
            )
            .and_where(Expr::col((cart::Entity, cart::Column::UserId)).eq(self.user_id))
            .to_owned()
    }

    fn user_column(&self, column: user::Column) -> SelectStatement {
        Query::select()
            .column((user::Entity, column))
            .from(user::Entity)
            .and_where(Expr::col((user::Entity, user::Column::Id)).eq(self.user_id))
            .to_owned()
    }
}

fn subquery(select: SelectStatement) -> SimpleExpr {
    SimpleExpr::SubQuery(None, Box::new(select.into_sub_query_statement()))
}

fn type_is(promo_type: PromoType) -> SimpleExpr {
    Expr::col((promo::Entity, promo::Column::PromoType)).eq(promo_type.to_value())
}

fn segmentation_is(segmentation: Segmentation) -> SimpleExpr {
    Expr::col((promo::Entity, promo::Column::Segmentation)).eq(segmentation.to_value())
}
