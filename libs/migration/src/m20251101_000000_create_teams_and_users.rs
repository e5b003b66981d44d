use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Teams::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Teams::TeamName).string().not_null().primary_key())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::UserId).string().not_null().primary_key())
                    .col(string(Users::Username))
                    .col(string(Users::TeamName))
                    .col(boolean(Users::IsActive).default(true))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_team_name")
                            .from(Users::Table, Users::TeamName)
                            .to(Teams::Table, Teams::TeamName)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Candidate lookups filter on both columns
        manager
            .create_index(
                Index::create()
                    .name("idx_users_team_name_is_active")
                    .table(Users::Table)
                    .col(Users::TeamName)
                    .col(Users::IsActive)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Teams::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub(crate) enum Teams {
    Table,
    TeamName,
}

#[derive(DeriveIden)]
pub(crate) enum Users {
    Table,
    UserId,
    Username,
    TeamName,
    IsActive,
}
