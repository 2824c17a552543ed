//! Create the `developers` table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Developers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Developers::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Developers::UserId).uuid().not_null())
                    // GitHub link
                    .col(ColumnDef::new(Developers::GithubHandle).string().null())
                    .col(
                        ColumnDef::new(Developers::GithubInstallationId)
                            .big_integer()
                            .null(),
                    )
                    // Synced fields
                    .col(
                        ColumnDef::new(Developers::TopLanguages)
                            .json()
                            .not_null()
                            .default(Expr::cust("'[]'")),
                    )
                    .col(
                        ColumnDef::new(Developers::LinkedProjects)
                            .json()
                            .not_null()
                            .default(Expr::cust("'[]'")),
                    )
                    // Timestamps
                    .col(
                        ColumnDef::new(Developers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Developers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_developers_user_id")
                    .table(Developers::Table)
                    .col(Developers::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_developers_github_handle")
                    .table(Developers::Table)
                    .col(Developers::GithubHandle)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Developers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
#[sea_orm(iden = "developers")]
enum Developers {
    Table,
    Id,
    UserId,
    GithubHandle,
    GithubInstallationId,
    TopLanguages,
    LinkedProjects,
    CreatedAt,
    UpdatedAt,
}
