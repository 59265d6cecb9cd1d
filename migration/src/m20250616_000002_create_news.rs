use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(News::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(News::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(News::Title).text().not_null())
                    .col(ColumnDef::new(News::Description).text().null())
                    .col(ColumnDef::new(News::Url).text().not_null())
                    .col(ColumnDef::new(News::Source).string_len(100).not_null())
                    .col(ColumnDef::new(News::PublishedAt).timestamp().not_null())
                    .col(
                        ColumnDef::new(News::Category)
                            .string_len(50)
                            .not_null()
                            .default("precious-metals"),
                    )
                    .col(ColumnDef::new(News::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // Listing is always newest first
        manager
            .create_index(
                Index::create()
                    .name("idx_news_published_at")
                    .table(News::Table)
                    .col(News::PublishedAt)
                    .to_owned(),
            )
            .await?;

        // URL lookups for the de-duplication policy (not unique: duplicates are allowed when it is off)
        manager
            .create_index(
                Index::create()
                    .name("idx_news_url")
                    .table(News::Table)
                    .col(News::Url)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(News::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum News {
    Table,
    Id,
    Title,
    Description,
    Url,
    Source,
    PublishedAt,
    Category,
    CreatedAt,
}
