use sea_orm_migration::sea_query::extension::postgres::Type;
use sea_orm_migration::{prelude::*, schema::*};

use crate::m20251101_000000_create_teams_and_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(PullRequestStatus::Enum)
                    .values([PullRequestStatus::Open, PullRequestStatus::Merged])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PullRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PullRequests::PullRequestId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(string(PullRequests::PullRequestName))
                    .col(string(PullRequests::AuthorId))
                    .col(
                        ColumnDef::new(PullRequests::Status)
                            .enumeration(
                                PullRequestStatus::Enum,
                                [PullRequestStatus::Open, PullRequestStatus::Merged],
                            )
                            .not_null()
                            .default("OPEN"),
                    )
                    .col(
                        timestamp_with_time_zone(PullRequests::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(timestamp_with_time_zone_null(PullRequests::MergedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pull_requests_author_id")
                            .from(PullRequests::Table, PullRequests::AuthorId)
                            .to(Users::Table, Users::UserId)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_pull_requests_created_at")
                    .table(PullRequests::Table)
                    .col(PullRequests::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PullRequestReviewers::Table)
                    .if_not_exists()
                    .col(string(PullRequestReviewers::PullRequestId))
                    .col(string(PullRequestReviewers::UserId))
                    .primary_key(
                        Index::create()
                            .col(PullRequestReviewers::PullRequestId)
                            .col(PullRequestReviewers::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pull_request_reviewers_pull_request_id")
                            .from(
                                PullRequestReviewers::Table,
                                PullRequestReviewers::PullRequestId,
                            )
                            .to(PullRequests::Table, PullRequests::PullRequestId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pull_request_reviewers_user_id")
                            .from(PullRequestReviewers::Table, PullRequestReviewers::UserId)
                            .to(Users::Table, Users::UserId)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Serves "which PRs is this user reviewing"
        manager
            .create_index(
                Index::create()
                    .name("idx_pull_request_reviewers_user_id")
                    .table(PullRequestReviewers::Table)
                    .col(PullRequestReviewers::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PullRequestReviewers::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(PullRequests::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(PullRequestStatus::Enum).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum PullRequests {
    Table,
    PullRequestId,
    PullRequestName,
    AuthorId,
    Status,
    CreatedAt,
    MergedAt,
}

#[derive(DeriveIden)]
enum PullRequestReviewers {
    Table,
    PullRequestId,
    UserId,
}

#[derive(DeriveIden)]
enum PullRequestStatus {
    #[sea_orm(iden = "pull_request_status")]
    Enum,
    #[sea_orm(iden = "OPEN")]
    Open,
    #[sea_orm(iden = "MERGED")]
    Merged,
}
