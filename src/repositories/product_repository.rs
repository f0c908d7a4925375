use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait};

use crate::entities::product::{
    ActiveModel as ProductActiveModel, Entity as Product, Model as ProductModel,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct ProductRepository;

impl ProductRepository {
    pub async fn find_by_id<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: i32,
    ) -> Result<Option<ProductModel>, DbErr> {
        Product::find_by_id(id).one(conn).await
    }

    pub async fn insert<C: ConnectionTrait>(
        &self,
        conn: &C,
        product: ProductActiveModel,
    ) -> Result<ProductModel, DbErr> {
        product.insert(conn).await
    }
}
