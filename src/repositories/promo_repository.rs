use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

use super::promo_eligibility::EligibilityQuery;
use crate::entities::{promo, promo_city};

#[derive(Debug, Clone, Copy, Default)]
pub struct PromoRepository;

impl PromoRepository {
    pub async fn find_by_id<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: i32,
    ) -> Result<Option<promo::Model>, DbErr> {
        promo::Entity::find_by_id(id).one(conn).await
    }

    pub async fn insert<C: ConnectionTrait>(
        &self,
        conn: &C,
        promo: promo::ActiveModel,
    ) -> Result<promo::Model, DbErr> {
        promo.insert(conn).await
    }

    pub async fn insert_cities<C: ConnectionTrait>(
        &self,
        conn: &C,
        promo_id: i32,
        cities: &[String],
    ) -> Result<(), DbErr> {
        if cities.is_empty() {
            return Ok(());
        }

        let now = Utc::now();
        let rows = cities.iter().map(|city| promo_city::ActiveModel {
            promo_id: Set(promo_id),
            city: Set(city.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        });
        promo_city::Entity::insert_many(rows).exec(conn).await?;
        Ok(())
    }

    pub async fn find_cities<C: ConnectionTrait>(
        &self,
        conn: &C,
        promo_id: i32,
    ) -> Result<Vec<promo_city::Model>, DbErr> {
        promo_city::Entity::find()
            .filter(promo_city::Column::PromoId.eq(promo_id))
            .order_by_asc(promo_city::Column::Id)
            .all(conn)
            .await
    }

    /// Writes every column of `promo` back, stamping `updated_at`.
    pub async fn save<C: ConnectionTrait>(
        &self,
        conn: &C,
        promo: promo::Model,
    ) -> Result<promo::Model, DbErr> {
        let mut active: promo::ActiveModel = promo.into();
        active = active.reset_all();
        active.updated_at = Set(Utc::now());
        active.update(conn).await
    }

    /// One page of eligible promos plus the total match count. A page past
    /// the last one is empty.
    pub async fn find_eligible_page<C: ConnectionTrait>(
        &self,
        conn: &C,
        query: &EligibilityQuery,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<promo::Model>, u64), DbErr> {
        let paginator = query.select().paginate(conn, per_page.max(1));
        let counts = paginator.num_items_and_pages().await?;
        // Pages past the end would overflow the offset for very large numbers.
        if page == 0 || page > counts.number_of_pages {
            return Ok((Vec::new(), counts.number_of_items));
        }
        let promos = paginator.fetch_page(page - 1).await?;
        Ok((promos, counts.number_of_items))
    }

    /// Every eligible promo, ordered by id.
    pub async fn find_eligible<C: ConnectionTrait>(
        &self,
        conn: &C,
        query: &EligibilityQuery,
    ) -> Result<Vec<promo::Model>, DbErr> {
        query.select().all(conn).await
    }
}
