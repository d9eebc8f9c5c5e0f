use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Advertisement::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Advertisement::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Advertisement::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Advertisement::Position).string_len(20).not_null())
                    .col(ColumnDef::new(Advertisement::Size).string_len(20).not_null())
                    .col(ColumnDef::new(Advertisement::Code).text().not_null())
                    .col(
                        ColumnDef::new(Advertisement::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Advertisement::Impressions)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Advertisement::Clicks)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Advertisement::StartDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Advertisement::EndDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Advertisement::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Advertisement::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_advertisement_position")
                    .table(Advertisement::Table)
                    .col(Advertisement::Position)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Advertisement::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Advertisement {
    Table,
    Id,
    Name,
    Position,
    Size,
    Code,
    IsActive,
    Impressions,
    Clicks,
    StartDate,
    EndDate,
    CreatedAt,
    UpdatedAt,
}
