use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait, Set};

use crate::entities::user::{ActiveModel as UserActiveModel, Entity as User, Model as UserModel};

#[derive(Debug, Clone, Copy, Default)]
pub struct UserRepository;

impl UserRepository {
    pub async fn find_by_id<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: i32,
    ) -> Result<Option<UserModel>, DbErr> {
        User::find_by_id(id).one(conn).await
    }

    pub async fn insert<C: ConnectionTrait>(
        &self,
        conn: &C,
        user: UserActiveModel,
    ) -> Result<UserModel, DbErr> {
        user.insert(conn).await
    }

    /// Persists the loyalty flag. Always writes, even when the flag is already set.
    pub async fn mark_loyal<C: ConnectionTrait>(
        &self,
        conn: &C,
        user: UserModel,
    ) -> Result<UserModel, DbErr> {
        let mut active: UserActiveModel = user.into();
        active.is_loyal = Set(true);
        active.updated_at = Set(Utc::now());
        active.update(conn).await
    }
}
