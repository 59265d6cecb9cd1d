use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // One row per published date; the date text is the upsert key
        manager
            .create_table(
                Table::create()
                    .table(SilverPrices::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SilverPrices::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        // Upstream text is kept verbatim, so no length cap
                        ColumnDef::new(SilverPrices::Date)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(SilverPrices::PriceKrw)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SilverPrices::PriceUsd)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SilverPrices::PriceOunce)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SilverPrices::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SilverPrices::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SilverPrices::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum SilverPrices {
    Table,
    Id,
    Date,
    PriceKrw,
    PriceUsd,
    PriceOunce,
    CreatedAt,
    UpdatedAt,
}
