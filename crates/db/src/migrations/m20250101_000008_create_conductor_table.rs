//! Create conductors table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Conductors::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Conductors::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Conductors::UserId)
                            .integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Conductors::Name).string_len(256).not_null())
                    .col(ColumnDef::new(Conductors::ConductorType).string_len(16).not_null())
                    .col(ColumnDef::new(Conductors::Description).text())
                    .col(ColumnDef::new(Conductors::ContactEmail).string_len(256).not_null())
                    .col(ColumnDef::new(Conductors::ContactPhone).string_len(64).not_null())
                    .col(ColumnDef::new(Conductors::Address).text().not_null())
                    .col(
                        ColumnDef::new(Conductors::OfficialEmail)
                            .string_len(256)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Conductors::IsVerified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Conductors::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Conductors::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: created_at (for pagination)
        manager
            .create_index(
                Index::create()
                    .name("idx_conductors_created_at")
                    .table(Conductors::Table)
                    .col(Conductors::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Conductors::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Conductors {
    Table,
    Id,
    UserId,
    Name,
    ConductorType,
    Description,
    ContactEmail,
    ContactPhone,
    Address,
    OfficialEmail,
    IsVerified,
    CreatedAt,
    UpdatedAt,
}
