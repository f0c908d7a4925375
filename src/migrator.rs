use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20241001_000001_create_users_and_products::Migration),
            Box::new(m20241001_000002_create_carts_tables::Migration),
            Box::new(m20241001_000003_create_promos_tables::Migration),
            Box::new(m20241001_000004_create_orders_tables::Migration),
        ]
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    City,
    IsLoyal,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    Name,
    Price,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Carts {
    Table,
    Id,
    UserId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum CartItems {
    Table,
    Id,
    CartId,
    ProductId,
    Quantity,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Promos {
    Table,
    Id,
    Name,
    Description,
    Segmentation,
    #[sea_orm(iden = "type")]
    PromoType,
    MinOrderAmount,
    DiscountValue,
    MaxDiscountAmount,
    BuyProductId,
    BuyProductQty,
    FreeProductId,
    FreeProductQty,
    StartDate,
    EndDate,
    MaxUsageLimit,
    CurrentUsageCount,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PromoCities {
    Table,
    Id,
    PromoId,
    City,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
    UserId,
    TotalAmount,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum OrderItems {
    Table,
    Id,
    OrderId,
    ProductId,
    Price,
    Quantity,
    TotalAmount,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum OrderPromos {
    Table,
    Id,
    OrderId,
    PromoId,
    DiscountAmount,
    FreeProductId,
    FreeProductQty,
    CreatedAt,
    UpdatedAt,
}

fn id_column<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

fn money_column<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).decimal_len(19, 4).to_owned()
}

fn timestamp_column<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .to_owned()
}

mod m20241001_000001_create_users_and_products {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20241001_000001_create_users_and_products"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(&mut id_column(Users::Id))
                        .col(ColumnDef::new(Users::Name).string_len(255).not_null())
                        .col(
                            ColumnDef::new(Users::Email)
                                .string_len(255)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Users::City).string_len(255).not_null())
                        .col(
                            ColumnDef::new(Users::IsLoyal)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(&mut timestamp_column(Users::CreatedAt))
                        .col(&mut timestamp_column(Users::UpdatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(&mut id_column(Products::Id))
                        .col(ColumnDef::new(Products::Name).string_len(255).not_null())
                        .col(money_column(Products::Price).not_null())
                        .col(&mut timestamp_column(Products::CreatedAt))
                        .col(&mut timestamp_column(Products::UpdatedAt))
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }
}

mod m20241001_000002_create_carts_tables {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20241001_000002_create_carts_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Carts::Table)
                        .if_not_exists()
                        .col(&mut id_column(Carts::Id))
                        .col(ColumnDef::new(Carts::UserId).integer().not_null())
                        .col(&mut timestamp_column(Carts::CreatedAt))
                        .col(&mut timestamp_column(Carts::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_carts_user_id")
                                .from(Carts::Table, Carts::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_carts_user_id")
                        .table(Carts::Table)
                        .col(Carts::UserId)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(CartItems::Table)
                        .if_not_exists()
                        .col(&mut id_column(CartItems::Id))
                        .col(ColumnDef::new(CartItems::CartId).integer().not_null())
                        .col(ColumnDef::new(CartItems::ProductId).integer().not_null())
                        .col(ColumnDef::new(CartItems::Quantity).integer().not_null())
                        .col(&mut timestamp_column(CartItems::CreatedAt))
                        .col(&mut timestamp_column(CartItems::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_cart_items_cart_id")
                                .from(CartItems::Table, CartItems::CartId)
                                .to(Carts::Table, Carts::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_cart_items_product_id")
                                .from(CartItems::Table, CartItems::ProductId)
                                .to(Products::Table, Products::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_cart_items_cart_product")
                        .table(CartItems::Table)
                        .col(CartItems::CartId)
                        .col(CartItems::ProductId)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(CartItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Carts::Table).to_owned())
                .await
        }
    }
}

mod m20241001_000003_create_promos_tables {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20241001_000003_create_promos_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Promos::Table)
                        .if_not_exists()
                        .col(&mut id_column(Promos::Id))
                        .col(ColumnDef::new(Promos::Name).string_len(255).not_null())
                        .col(ColumnDef::new(Promos::Description).text().null())
                        .col(
                            ColumnDef::new(Promos::Segmentation)
                                .string_len(20)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Promos::PromoType).string_len(20).not_null())
                        .col(money_column(Promos::MinOrderAmount).not_null().default(0))
                        .col(money_column(Promos::DiscountValue).not_null().default(0))
                        .col(money_column(Promos::MaxDiscountAmount).null())
                        .col(ColumnDef::new(Promos::BuyProductId).integer().null())
                        .col(
                            ColumnDef::new(Promos::BuyProductQty)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Promos::FreeProductId).integer().null())
                        .col(
                            ColumnDef::new(Promos::FreeProductQty)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(&mut timestamp_column(Promos::StartDate))
                        .col(&mut timestamp_column(Promos::EndDate))
                        .col(ColumnDef::new(Promos::MaxUsageLimit).integer().null())
                        .col(
                            ColumnDef::new(Promos::CurrentUsageCount)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(&mut timestamp_column(Promos::CreatedAt))
                        .col(&mut timestamp_column(Promos::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_promos_buy_product_id")
                                .from(Promos::Table, Promos::BuyProductId)
                                .to(Products::Table, Products::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_promos_free_product_id")
                                .from(Promos::Table, Promos::FreeProductId)
                                .to(Products::Table, Products::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PromoCities::Table)
                        .if_not_exists()
                        .col(&mut id_column(PromoCities::Id))
                        .col(ColumnDef::new(PromoCities::PromoId).integer().not_null())
                        .col(ColumnDef::new(PromoCities::City).string_len(255).not_null())
                        .col(&mut timestamp_column(PromoCities::CreatedAt))
                        .col(&mut timestamp_column(PromoCities::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_promo_cities_promo_id")
                                .from(PromoCities::Table, PromoCities::PromoId)
                                .to(Promos::Table, Promos::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_promo_cities_promo_id")
                        .table(PromoCities::Table)
                        .col(PromoCities::PromoId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PromoCities::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Promos::Table).to_owned())
                .await
        }
    }
}

mod m20241001_000004_create_orders_tables {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20241001_000004_create_orders_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(&mut id_column(Orders::Id))
                        .col(ColumnDef::new(Orders::UserId).integer().not_null())
                        .col(money_column(Orders::TotalAmount).not_null())
                        .col(&mut timestamp_column(Orders::CreatedAt))
                        .col(&mut timestamp_column(Orders::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_orders_user_id")
                                .from(Orders::Table, Orders::UserId)
                                .to(Users::Table, Users::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_user_id")
                        .table(Orders::Table)
                        .col(Orders::UserId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OrderItems::Table)
                        .if_not_exists()
                        .col(&mut id_column(OrderItems::Id))
                        .col(ColumnDef::new(OrderItems::OrderId).integer().not_null())
                        .col(ColumnDef::new(OrderItems::ProductId).integer().not_null())
                        .col(money_column(OrderItems::Price).not_null())
                        .col(ColumnDef::new(OrderItems::Quantity).integer().not_null())
                        .col(money_column(OrderItems::TotalAmount).not_null())
                        .col(&mut timestamp_column(OrderItems::CreatedAt))
                        .col(&mut timestamp_column(OrderItems::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_order_id")
                                .from(OrderItems::Table, OrderItems::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_product_id")
                                .from(OrderItems::Table, OrderItems::ProductId)
                                .to(Products::Table, Products::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OrderPromos::Table)
                        .if_not_exists()
                        .col(&mut id_column(OrderPromos::Id))
                        .col(ColumnDef::new(OrderPromos::OrderId).integer().not_null())
                        .col(ColumnDef::new(OrderPromos::PromoId).integer().not_null())
                        .col(
                            money_column(OrderPromos::DiscountAmount)
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(OrderPromos::FreeProductId).integer().null())
                        .col(
                            ColumnDef::new(OrderPromos::FreeProductQty)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(&mut timestamp_column(OrderPromos::CreatedAt))
                        .col(&mut timestamp_column(OrderPromos::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_promos_order_id")
                                .from(OrderPromos::Table, OrderPromos::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_promos_promo_id")
                                .from(OrderPromos::Table, OrderPromos::PromoId)
                                .to(Promos::Table, Promos::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_promos_free_product_id")
                                .from(OrderPromos::Table, OrderPromos::FreeProductId)
                                .to(Products::Table, Products::Id),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderPromos::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(OrderItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }
}
