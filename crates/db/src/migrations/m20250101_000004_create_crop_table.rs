//! Create crop table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Crop::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Crop::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Crop::FarmerId).string_len(32).not_null())
                    .col(ColumnDef::new(Crop::Name).string_len(256).not_null())
                    .col(ColumnDef::new(Crop::Description).text())
                    .col(ColumnDef::new(Crop::Category).string_len(128))
                    .col(
                        ColumnDef::new(Crop::Status)
                            .string_len(16)
                            .not_null()
                            .default("growing"),
                    )
                    .col(ColumnDef::new(Crop::Quantity).double())
                    .col(ColumnDef::new(Crop::Unit).string_len(32))
                    .col(
                        ColumnDef::new(Crop::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Crop::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_crop_farmer")
                            .from(Crop::Table, Crop::FarmerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_crop_farmer_id")
                    .table(Crop::Table)
                    .col(Crop::FarmerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_crop_status")
                    .table(Crop::Table)
                    .col(Crop::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Crop::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Crop {
    Table,
    Id,
    FarmerId,
    Name,
    Description,
    Category,
    Status,
    Quantity,
    Unit,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
