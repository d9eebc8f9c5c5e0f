use sea_orm_migration::prelude::*;

/// Creates the `game` table for catalog entries.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[allow(clippy::enum_variant_names)]
#[derive(DeriveIden)]
enum Game {
    Table,
    Id,
    Title,
    Slug,
    Description,
    LongDescription,
    Thumbnail,
    Screenshots,
    CategoryId,
    Tags,
    PlayCount,
    Views,
    Rating,
    ReviewCount,
    Developer,
    FileUrl,
    GameUrl,
    IsFeatured,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Category {
    Table,
    Id,
}

#[async_trait::async_trait]
#[allow(clippy::too_many_lines)]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Game::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Game::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Game::Title).string_len(200).not_null())
                    .col(
                        ColumnDef::new(Game::Slug)
                            .string_len(220)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Game::Description).text().not_null())
                    .col(ColumnDef::new(Game::LongDescription).text().null())
                    .col(ColumnDef::new(Game::Thumbnail).string_len(500).not_null())
                    .col(
                        ColumnDef::new(Game::Screenshots)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(ColumnDef::new(Game::CategoryId).integer().not_null())
                    .col(ColumnDef::new(Game::Tags).text().not_null().default("[]"))
                    .col(
                        ColumnDef::new(Game::PlayCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Game::Views)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Game::Rating).double().null())
                    .col(
                        ColumnDef::new(Game::ReviewCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Game::Developer).string_len(100).null())
                    .col(ColumnDef::new(Game::FileUrl).string_len(500).null())
                    .col(ColumnDef::new(Game::GameUrl).string_len(500).null())
                    .col(
                        ColumnDef::new(Game::IsFeatured)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Game::Status)
                            .string_len(20)
                            .not_null()
                            .default("ACTIVE"),
                    )
                    .col(
                        ColumnDef::new(Game::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Game::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_game_category_id")
                            .from(Game::Table, Game::CategoryId)
                            .to(Category::Table, Category::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_game_category_id")
                    .table(Game::Table)
                    .col(Game::CategoryId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_game_status_play_count")
                    .table(Game::Table)
                    .col(Game::Status)
                    .col(Game::PlayCount)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Game::Table).to_owned())
            .await
    }
}
