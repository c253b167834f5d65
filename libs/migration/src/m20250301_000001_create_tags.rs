use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tags::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tags::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    // Uniqueness of the name is what makes concurrent creates converge
                    .col(
                        ColumnDef::new(Tags::Name)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(timestamp_with_time_zone(Tags::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(Tags::UpdatedAt).default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Tags::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Tags {
    Table,
    Id,
    Name,
    CreatedAt,
    UpdatedAt,
}
