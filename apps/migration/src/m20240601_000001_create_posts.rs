//! Posts and their tags. The unique index on `handle` is what rejects a
//! handle claimed by a concurrent writer.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Posts {
    Table,
    Id,
    ShopId,
    Title,
    PageTitle,
    Keywords,
    MetaDescription,
    Annotation,
    Body,
    Handle,
    IsVisible,
    IsRecommended,
    CreatedAt,
    UpdatedAt,
    PublishedAt,
}

#[derive(DeriveIden)]
enum PostHashtags {
    Table,
    PostId,
    TagId,
    Position,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Posts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Posts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Posts::ShopId).uuid().not_null())
                    .col(ColumnDef::new(Posts::Title).string().not_null().default(""))
                    .col(ColumnDef::new(Posts::PageTitle).string())
                    .col(ColumnDef::new(Posts::Keywords).string())
                    .col(ColumnDef::new(Posts::MetaDescription).string())
                    .col(ColumnDef::new(Posts::Annotation).text())
                    .col(ColumnDef::new(Posts::Body).text().not_null().default(""))
                    .col(ColumnDef::new(Posts::Handle).string().not_null())
                    .col(
                        ColumnDef::new(Posts::IsVisible)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Posts::IsRecommended)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Posts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Posts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Posts::PublishedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_posts_handle")
                    .table(Posts::Table)
                    .col(Posts::Handle)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_posts_shop_published")
                    .table(Posts::Table)
                    .col(Posts::ShopId)
                    .col(Posts::PublishedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PostHashtags::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PostHashtags::PostId).uuid().not_null())
                    .col(ColumnDef::new(PostHashtags::TagId).uuid().not_null())
                    .col(
                        ColumnDef::new(PostHashtags::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .primary_key(
                        Index::create()
                            .col(PostHashtags::PostId)
                            .col(PostHashtags::TagId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_hashtags_post")
                            .from(PostHashtags::Table, PostHashtags::PostId)
                            .to(Posts::Table, Posts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_post_hashtags_tag")
                    .table(PostHashtags::Table)
                    .col(PostHashtags::TagId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PostHashtags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Posts::Table).to_owned())
            .await
    }
}
