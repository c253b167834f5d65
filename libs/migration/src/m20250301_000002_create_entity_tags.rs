use sea_orm_migration::{prelude::*, schema::*};

use crate::m20250301_000001_create_tags::Tags;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EntityTags::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EntityTags::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(big_integer(EntityTags::EntityId))
                    .col(big_integer(EntityTags::TagId))
                    .col(
                        timestamp_with_time_zone(EntityTags::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(EntityTags::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_entity_tags_tag_id")
                            .from(EntityTags::Table, EntityTags::TagId)
                            .to(Tags::Table, Tags::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Target of ON CONFLICT when linking
        manager
            .create_index(
                Index::create()
                    .name("uq_entity_tags_entity_id_tag_id")
                    .table(EntityTags::Table)
                    .col(EntityTags::EntityId)
                    .col(EntityTags::TagId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Serves listing an entity's links in creation order
        manager
            .create_index(
                Index::create()
                    .name("idx_entity_tags_entity_id_id")
                    .table(EntityTags::Table)
                    .col(EntityTags::EntityId)
                    .col(EntityTags::Id)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EntityTags::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum EntityTags {
    Table,
    Id,
    EntityId,
    TagId,
    CreatedAt,
    UpdatedAt,
}
