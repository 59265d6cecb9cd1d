use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Holds at most one row, replaced on every chart scrape
        manager
            .create_table(
                Table::create()
                    .table(SilverCharts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SilverCharts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SilverCharts::ImageUrl).text().not_null())
                    .col(ColumnDef::new(SilverCharts::ImageData).text().not_null())
                    .col(ColumnDef::new(SilverCharts::LastUpdated).timestamp().not_null())
                    .col(ColumnDef::new(SilverCharts::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SilverCharts::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum SilverCharts {
    Table,
    Id,
    ImageUrl,
    ImageData,
    LastUpdated,
    CreatedAt,
}
