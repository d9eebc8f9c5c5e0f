use sea_orm_migration::prelude::*;

/// Creates the `search_query` analytics log. No foreign keys: entries outlive
/// the games and categories they matched.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SearchQuery::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SearchQuery::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SearchQuery::Query).string_len(255).not_null())
                    .col(ColumnDef::new(SearchQuery::IpAddress).string_len(64).null())
                    .col(ColumnDef::new(SearchQuery::UserAgent).string_len(500).null())
                    .col(
                        ColumnDef::new(SearchQuery::Results)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SearchQuery::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Trending scans a 7 day window
        manager
            .create_index(
                Index::create()
                    .name("idx_search_query_created_at")
                    .table(SearchQuery::Table)
                    .col(SearchQuery::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SearchQuery::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum SearchQuery {
    Table,
    Id,
    Query,
    IpAddress,
    UserAgent,
    Results,
    CreatedAt,
}
